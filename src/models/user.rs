use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    // Alphanumeric, underscores and hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// A registered account. Only the bcrypt hash of the password is kept.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Sign-up and sign-in payload.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AuthCredentials {
    #[validate(
        length(min = 4, max = 20),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,

    #[validate(length(min = 6, max = 32))]
    pub password: String,
}

/// Returned by a successful sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub access_token: String,
}
