use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::error::{AppError, AppResult};

/// Salted bcrypt hashing with a configurable work factor.
///
/// Each call to `hash` draws a fresh random salt, so equal passwords never
/// produce equal hashes. Work runs on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> AppResult<Self> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(AppError::Internal(format!("Invalid bcrypt cost {}", cost)));
        }
        Ok(Self { cost })
    }

    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let hasher = *self;

        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Hashes on the calling thread. Outside of startup, use `hash`.
    pub fn hash_blocking(&self, password: &str) -> AppResult<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Checks `password` against a stored hash. bcrypt compares the digests in
    /// constant time.
    pub async fn verify(&self, password: &str, hashed_password: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hashed_password = hashed_password.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed_password))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
    }
}
