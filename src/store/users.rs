use async_trait::async_trait;
use sqlx::PgPool;

use super::{classify_insert_error, unavailable, UserStore};
use crate::error::AppResult;
use crate::models::User;

/// Credential store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        // No existence pre-check: the unique index on username decides, so
        // concurrent sign-ups with one name yield exactly one row.
        let user = User::new(username, password_hash);
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, password_hash, created_at",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_insert_error(&format!("Failed to create user \"{}\"", username), e))?;

        log::info!("created user {} ({})", user.username, user.id);
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable(&format!("Failed to look up user \"{}\"", username), e))
    }
}
