/// Task operations guarded by ownership rules
///
/// [`TaskService`] sits between the request handlers and the
/// [`TaskRepository`]: it validates creation input, runs the authorization
/// guard before mutations and turns missing rows into `NotFound`.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::{authorize_task_mutation, AuthzError, TaskAction};
use crate::auth::middleware::AuthContext;
use crate::models::task::{CreateTaskInput, NewTask, Task, TaskCounts, TaskStatus, VisibleTask};
use crate::models::FieldError;
use crate::store::{StoreError, TaskRepository};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Creation input rejected
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Task not found")]
    NotFound,

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Task operations for authenticated callers
#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// Creates a task owned by the caller
    pub async fn create(&self, auth: &AuthContext, input: CreateTaskInput) -> Result<Task, TaskError> {
        let new_task = NewTask::validate(auth.user_id, input).map_err(TaskError::Validation)?;

        let task = self.repo.insert_task(new_task).await?;

        info!(
            task_id = %task.id,
            owner = %auth.user_id,
            assigned_to = task.assigned_to.as_str(),
            "Task created"
        );
        Ok(task)
    }

    /// Tasks assigned to the caller plus the caller's personal tasks
    pub async fn list_visible(&self, auth: &AuthContext) -> Result<Vec<VisibleTask>, TaskError> {
        Ok(self.repo.list_visible(auth.user_id, &auth.email).await?)
    }

    /// Overwrites a task's status
    ///
    /// Any authenticated caller may do this; transitions are unconstrained.
    pub async fn update_status(
        &self,
        auth: &AuthContext,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<Task, TaskError> {
        let task = self.repo.find_task(task_id).await?.ok_or(TaskError::NotFound)?;

        authorize_task_mutation(auth, &task, TaskAction::UpdateStatus)?;

        let updated = self
            .repo
            .set_status(task_id, status)
            .await?
            .ok_or(TaskError::NotFound)?;

        info!(task_id = %task_id, user_id = %auth.user_id, status = %status, "Task status updated");
        Ok(updated)
    }

    /// Deletes a task owned by the caller
    ///
    /// # Errors
    ///
    /// - `TaskError::NotFound` if the task doesn't exist
    /// - `TaskError::Forbidden` if the caller isn't the owner
    pub async fn delete(&self, auth: &AuthContext, task_id: Uuid) -> Result<(), TaskError> {
        let task = self.repo.find_task(task_id).await?.ok_or(TaskError::NotFound)?;

        if let Err(e) = authorize_task_mutation(auth, &task, TaskAction::Delete) {
            debug!(task_id = %task_id, user_id = %auth.user_id, "Delete refused: not the owner");
            return Err(e.into());
        }

        // Lost a race with another delete
        if !self.repo.delete_task(task_id).await? {
            return Err(TaskError::NotFound);
        }

        info!(task_id = %task_id, user_id = %auth.user_id, "Task deleted");
        Ok(())
    }

    /// Dashboard counts for the caller
    pub async fn summary(&self, auth: &AuthContext) -> Result<TaskCounts, TaskError> {
        let personal_tasks_count = self.repo.count_personal_by_owner(auth.user_id).await?;
        let assigned_tasks_count = self.repo.count_by_assignee_email(&auth.email).await?;

        Ok(TaskCounts {
            personal_tasks_count,
            assigned_tasks_count,
        })
    }
}
