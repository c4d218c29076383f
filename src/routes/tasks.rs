use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CreateTaskInput, TaskFilter, UpdateTaskStatusInput},
    tasks::TaskService,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `status` (optional): Only tasks with this status (`OPEN`, `IN_PROGRESS`, `DONE`).
/// - `search` (optional): Only tasks whose title or description contains this
///   text, case-insensitively.
///
/// Both conditions apply together when given. Tasks are ordered newest first.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    filter: web::Query<TaskFilter>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = tasks.list_tasks(&user.0, &filter).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new `OPEN` task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: Returns the new task.
/// - `422 Unprocessable Entity`: Title empty or too long, or description too long.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    input: web::Json<CreateTaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    let task = tasks.create_task(&user.0, &input).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task. Tasks of other users are reported as `404 Not Found`.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.get_task(&user.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `404 Not Found`: No such task for this user.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    tasks.delete_task(&user.0, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sets the status of a task and returns the updated task.
#[patch("/{id}/status")]
pub async fn update_task_status(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    input: web::Json<UpdateTaskStatusInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update_task_status(&user.0, task_id.into_inner(), input.status)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}
