//!
//! # Error Handling
//!
//! This module defines `AppError`, the closed set of failures every store,
//! service and handler in the crate reports. Stores classify their backend
//! failures into it, services only add not-found translation, and the HTTP
//! boundary maps each kind to a status code through `ResponseError`.
//!
//! Internal causes (`StoreUnavailable`, `Internal`) are logged when the
//! response is built and replaced by a generic message, so database details
//! never reach the caller.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

/// Message returned for every failed sign-in, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Please check your login credentials";

/// Every error the application can surface.
#[derive(Debug, Error)]
pub enum AppError {
    /// Sign-up with a username that is already registered (HTTP 409).
    #[error("Username already exists")]
    DuplicateUsername,

    /// Sign-in with an unknown username or a wrong password (HTTP 401).
    /// Both causes share this variant and its message.
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    /// The task does not exist or belongs to another user (HTTP 404).
    #[error("Task with id {0} not found")]
    TaskNotFound(Uuid),

    /// The persistent store failed for a reason other than a constraint (HTTP 500).
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Unexpected server-side failure (HTTP 500).
    #[error("Internal error: {0}")]
    Internal(String),

    /// Missing, malformed or expired session token (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request payload failed validation (HTTP 422).
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TaskNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StoreUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::StoreUnavailable(_) | AppError::Internal(_) => {
                log::error!("{}", self);
                "Internal server error".to_string()
            }
            AppError::Unauthorized(reason) => {
                log::debug!("rejected request: {}", reason);
                "Unauthorized".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

// Only field names and rule codes are reported. The rejected values stay out
// of the message since they can include a password.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        let mut fields: Vec<String> = error
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let codes: Vec<&str> = errors.iter().map(|e| e.code.as_ref()).collect();
                format!("{}: {}", field, codes.join(", "))
            })
            .collect();
        fields.sort();
        AppError::Validation(fields.join("; "))
    }
}
