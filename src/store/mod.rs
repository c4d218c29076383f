//! Data-access interfaces for users and tasks, with their Postgres
//! implementations.
//!
//! Every backend failure is classified here, at the store boundary: a unique
//! constraint violation on insert becomes `AppError::DuplicateUsername`,
//! anything else becomes `AppError::StoreUnavailable` after being logged.

pub mod tasks;
pub mod users;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Task, TaskFilter, TaskStatus, User};

pub use tasks::PgTaskStore;
pub use users::PgUserStore;

/// Persistence of user credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with `DuplicateUsername` when the store's unique
    /// constraint on username rejects the row.
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User>;

    /// Looks up a user; absence is `Ok(None)`.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
}

/// Persistence of tasks. Every operation is scoped to `owner`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts an `OPEN` task owned by `owner`.
    async fn create_task(&self, title: &str, description: &str, owner: &User) -> AppResult<Task>;

    /// All of `owner`'s tasks satisfying every condition in `filter`.
    async fn get_tasks(&self, filter: &TaskFilter, owner: &User) -> AppResult<Vec<Task>>;

    /// The task with `id` if it exists and belongs to `owner`, else `TaskNotFound`.
    async fn get_task_by_id(&self, id: Uuid, owner: &User) -> AppResult<Task>;

    /// Deletes the task matching `id` and `owner`, returning the number of rows removed.
    async fn delete_task(&self, id: Uuid, owner: &User) -> AppResult<u64>;

    /// Sets the status of `owner`'s task `id`, or fails with `TaskNotFound`.
    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        owner: &User,
    ) -> AppResult<Task>;
}

/// Maps a database failure that is not a constraint violation.
pub(crate) fn unavailable(context: &str, error: sqlx::Error) -> AppError {
    log::error!("{}: {}", context, error);
    AppError::StoreUnavailable(error.to_string())
}

/// Maps a failed user insert, recognising the unique-username constraint.
pub(crate) fn classify_insert_error(context: &str, error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return AppError::DuplicateUsername;
        }
    }
    unavailable(context, error)
}
