use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{unavailable, TaskStore};
use crate::error::{AppError, AppResult};
use crate::models::{Task, TaskFilter, TaskStatus, User};

const TASK_COLUMNS: &str = "id, title, description, status, user_id, created_at, updated_at";

/// Task store backed by the `tasks` table.
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Builds the listing query for `owner_id`.
///
/// The owner condition comes first and every filter condition is appended
/// with `AND`, so a filter can only narrow the owner's tasks.
pub fn list_query(filter: &TaskFilter, owner_id: Uuid) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT ");
    query
        .push(TASK_COLUMNS)
        .push(" FROM tasks WHERE user_id = ")
        .push_bind(owner_id);

    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }

    if let Some(search) = filter.search_term() {
        let pattern = like_pattern(search);
        query
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    query.push(" ORDER BY created_at DESC");
    query
}

/// Wraps `search` for a substring `ILIKE`, escaping its wildcards.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create_task(&self, title: &str, description: &str, owner: &User) -> AppResult<Task> {
        let task = Task::new(title, description, owner.id);

        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, description, status, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            unavailable(
                &format!("Failed to create task for user \"{}\"", owner.username),
                e,
            )
        })
    }

    async fn get_tasks(&self, filter: &TaskFilter, owner: &User) -> AppResult<Vec<Task>> {
        list_query(filter, owner.id)
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                unavailable(
                    &format!(
                        "Failed to get tasks for user \"{}\". Filter: {:?}",
                        owner.username, filter
                    ),
                    e,
                )
            })
    }

    async fn get_task_by_id(&self, id: Uuid, owner: &User) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable(&format!("Failed to get task {}", id), e))?
        .ok_or(AppError::TaskNotFound(id))
    }

    async fn delete_task(&self, id: Uuid, owner: &User) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.id)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable(&format!("Failed to delete task {}", id), e))?;

        Ok(result.rows_affected())
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        owner: &User,
    ) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET status = $1, updated_at = NOW()
             WHERE id = $2 AND user_id = $3
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(status)
        .bind(id)
        .bind(owner.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable(&format!("Failed to update status of task {}", id), e))?
        .ok_or(AppError::TaskNotFound(id))
    }
}
