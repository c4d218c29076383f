use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CreateTaskInput, Task, TaskFilter, TaskStatus, User};
use crate::store::TaskStore;

/// Task operations on behalf of an authenticated owner.
///
/// Each method takes the caller's `User` and hands it to the store, which
/// scopes every read and write to that owner.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn list_tasks(&self, owner: &User, filter: &TaskFilter) -> AppResult<Vec<Task>> {
        self.store.get_tasks(filter, owner).await
    }

    pub async fn create_task(&self, owner: &User, input: &CreateTaskInput) -> AppResult<Task> {
        let task = self
            .store
            .create_task(&input.title, &input.description, owner)
            .await?;

        log::info!("user {} created task {}", owner.username, task.id);
        Ok(task)
    }

    pub async fn get_task(&self, owner: &User, id: Uuid) -> AppResult<Task> {
        self.store.get_task_by_id(id, owner).await
    }

    /// Deletes the task, reporting `TaskNotFound` when nothing matched.
    pub async fn delete_task(&self, owner: &User, id: Uuid) -> AppResult<()> {
        if self.store.delete_task(id, owner).await? == 0 {
            return Err(AppError::TaskNotFound(id));
        }

        log::info!("user {} deleted task {}", owner.username, id);
        Ok(())
    }

    pub async fn update_task_status(
        &self,
        owner: &User,
        id: Uuid,
        status: TaskStatus,
    ) -> AppResult<Task> {
        let task = self.store.update_task_status(id, status, owner).await?;

        log::debug!("user {} set task {} to {:?}", owner.username, id, status);
        Ok(task)
    }
}
