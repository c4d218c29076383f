use crate::{auth::AuthService, error::AppError, models::AuthCredentials};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: The account was created. The body is empty.
/// - `409 Conflict`: The username is taken.
/// - `422 Unprocessable Entity`: The credentials fail validation.
#[post("/signup")]
pub async fn sign_up(
    auth: web::Data<AuthService>,
    credentials: web::Json<AuthCredentials>,
) -> Result<impl Responder, AppError> {
    credentials.validate()?;

    auth.sign_up(&credentials.username, &credentials.password)
        .await?;

    Ok(HttpResponse::Created().finish())
}

/// Sign in
///
/// Returns `{"access_token": ...}` on success and `401 Unauthorized` with the
/// same body for an unknown username or a wrong password.
#[post("/signin")]
pub async fn sign_in(
    auth: web::Data<AuthService>,
    credentials: web::Json<AuthCredentials>,
) -> Result<impl Responder, AppError> {
    credentials.validate()?;

    let response = auth
        .sign_in(&credentials.username, &credentials.password)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}
