pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{SignInResponse, User};
use crate::store::UserStore;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};

/// Registers users and turns credentials into session tokens.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
    // Verified against when the username is unknown, so that path costs the
    // same as a wrong password.
    dummy_hash: String,
}

impl AuthService {
    /// Builds the service, hashing the placeholder used for unknown usernames
    /// up front so the first such sign-in is not slower than later ones.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        tokens: TokenService,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash_blocking("timing-equalization-placeholder")?;
        Ok(Self {
            users,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    /// Hashes `password` with a fresh salt and stores the new user.
    ///
    /// `DuplicateUsername` is propagated as is; any other store failure is
    /// reported as `Internal`.
    pub async fn sign_up(&self, username: &str, password: &str) -> AppResult<User> {
        let password_hash = self.hasher.hash(password).await?;

        let user = self
            .users
            .create_user(username, &password_hash)
            .await
            .map_err(internal_unless_domain)?;

        log::info!("user {} signed up", user.username);
        Ok(user)
    }

    /// Verifies credentials and issues a session token for `username`.
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    pub async fn sign_in(&self, username: &str, password: &str) -> AppResult<SignInResponse> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(internal_unless_domain)?;

        let verified = match &user {
            Some(user) => self.hasher.verify(password, &user.password_hash).await?,
            None => {
                self.hasher.verify(password, &self.dummy_hash).await?;
                false
            }
        };

        if !verified {
            log::debug!("failed sign-in attempt for {}", username);
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(username)?;
        log::debug!("user {} signed in", username);
        Ok(SignInResponse { access_token })
    }

    /// Resolves a session token to the stored user it names.
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.tokens.verify(token)?;

        self.users
            .find_by_username(&claims.sub)
            .await
            .map_err(internal_unless_domain)?
            .ok_or_else(|| AppError::Unauthorized(format!("Unknown user {}", claims.sub)))
    }
}

fn internal_unless_domain(error: AppError) -> AppError {
    match error {
        AppError::StoreUnavailable(cause) => AppError::Internal(cause),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BCRYPT_COST;
    use chrono::Duration;
    use crate::store::MockUserStore;

    fn service(store: MockUserStore) -> AuthService {
        AuthService::new(
            Arc::new(store),
            PasswordHasher::new(MIN_BCRYPT_COST).unwrap(),
            TokenService::new("unit-test-secret", Duration::hours(1)),
        )
        .unwrap()
    }

    fn stored_user(username: &str, password: &str) -> User {
        let hash = bcrypt::hash(password, MIN_BCRYPT_COST).unwrap();
        User::new(username, hash)
    }

    #[actix_rt::test]
    async fn test_sign_up_stores_hash_not_plaintext() {
        let mut store = MockUserStore::new();
        store
            .expect_create_user()
            .withf(|username, hash| {
                username == "alice"
                    && hash != "secret123"
                    && bcrypt::verify("secret123", hash).unwrap_or(false)
            })
            .times(1)
            .returning(|username, hash| Ok(User::new(username, hash)));

        let user = service(store).sign_up("alice", "secret123").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[actix_rt::test]
    async fn test_sign_up_propagates_duplicate_username() {
        let mut store = MockUserStore::new();
        store
            .expect_create_user()
            .returning(|_, _| Err(AppError::DuplicateUsername));

        let result = service(store).sign_up("alice", "secret123").await;
        assert!(matches!(result, Err(AppError::DuplicateUsername)));
    }

    #[actix_rt::test]
    async fn test_sign_up_wraps_store_failure_as_internal() {
        let mut store = MockUserStore::new();
        store
            .expect_create_user()
            .returning(|_, _| Err(AppError::StoreUnavailable("connection reset".into())));

        let result = service(store).sign_up("alice", "secret123").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[actix_rt::test]
    async fn test_sign_in_issues_token_for_username() {
        let user = stored_user("alice", "secret123");
        let mut store = MockUserStore::new();
        store
            .expect_find_by_username()
            .withf(|username| username == "alice")
            .returning(move |_| Ok(Some(user.clone())));

        let auth = service(store);
        let response = auth.sign_in("alice", "secret123").await.unwrap();
        let claims = auth.tokens.verify(&response.access_token).unwrap();

        assert_eq!(claims.sub, "alice");
    }

    #[actix_rt::test]
    async fn test_sign_in_failures_are_indistinguishable() {
        let user = stored_user("alice", "secret123");
        let mut store = MockUserStore::new();
        store
            .expect_find_by_username()
            .returning(move |username| Ok((username == "alice").then(|| user.clone())));
        let auth = service(store);

        let wrong_password = auth.sign_in("alice", "not-the-password").await.unwrap_err();
        let unknown_user = auth.sign_in("mallory", "secret123").await.unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[actix_rt::test]
    async fn test_unknown_user_hash_is_ready_after_construction() {
        let mut store = MockUserStore::new();
        store.expect_find_by_username().returning(|_| Ok(None));
        let auth = service(store);

        assert!(auth.dummy_hash.starts_with("$2b$04$"));
        assert!(bcrypt::verify("timing-equalization-placeholder", &auth.dummy_hash).unwrap());
        assert!(matches!(
            auth.sign_in("nobody", "secret123").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[actix_rt::test]
    async fn test_authenticate_rejects_token_of_missing_user() {
        let mut store = MockUserStore::new();
        store.expect_find_by_username().returning(|_| Ok(None));
        let auth = service(store);
        let token = auth.tokens.issue("ghost").unwrap();

        assert!(matches!(
            auth.authenticate(&token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_rt::test]
    async fn test_authenticate_resolves_user() {
        let user = stored_user("alice", "secret123");
        let expected = user.clone();
        let mut store = MockUserStore::new();
        store
            .expect_find_by_username()
            .withf(|username| username == "alice")
            .returning(move |_| Ok(Some(user.clone())));
        let auth = service(store);
        let token = auth.tokens.issue("alice").unwrap();

        assert_eq!(auth.authenticate(&token).await.unwrap(), expected);
    }
}
