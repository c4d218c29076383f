use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle state of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Newly created, not started.
    Open,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

/// A task as stored in the database and returned by the API.
///
/// The owner reference is never serialized: every caller only ever sees
/// its own tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// Identifier of the owning user.
    #[serde(skip)]
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a fresh `OPEN` task owned by `user_id`.
    pub fn new(title: impl Into<String>, description: impl Into<String>, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            status: TaskStatus::Open,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: String,
}

/// Payload for changing the status of a task.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTaskStatusInput {
    pub status: TaskStatus,
}

/// Query parameters for listing tasks. Every present condition must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Only tasks with exactly this status.
    pub status: Option<TaskStatus>,
    /// Only tasks whose title or description contains this text (case-insensitive).
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The search text, or `None` when absent or empty.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}
