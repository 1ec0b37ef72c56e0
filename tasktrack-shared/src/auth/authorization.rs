/// Ownership checks on task mutations
///
/// Every task has exactly one owning identity, the user who created it.
///
/// | Action        | Who may perform it            |
/// |---------------|-------------------------------|
/// | Create        | any authenticated user        |
/// | UpdateStatus  | any authenticated user        |
/// | Delete        | the owning identity only      |
///
/// Status updates are not restricted to the owner or the assignee.
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::authorization::{authorize_task_mutation, TaskAction};
/// use tasktrack_shared::auth::middleware::AuthContext;
/// # use tasktrack_shared::models::task::{AssignmentMode, Task, TaskStatus};
/// # use uuid::Uuid;
/// # let owner = Uuid::new_v4();
/// # let task = Task {
/// #     id: Uuid::new_v4(),
/// #     name: "n".into(),
/// #     description: "d".into(),
/// #     assigned_to: AssignmentMode::Personal,
/// #     assignee_email: None,
/// #     status: TaskStatus::Pending,
/// #     assigned_by: owner,
/// #     created_at: chrono::Utc::now(),
/// # };
///
/// let stranger = AuthContext { user_id: Uuid::new_v4(), email: "b@example.com".into() };
/// assert!(authorize_task_mutation(&stranger, &task, TaskAction::UpdateStatus).is_ok());
/// assert!(authorize_task_mutation(&stranger, &task, TaskAction::Delete).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::task::Task;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller doesn't own the resource
    #[error("Not authorized to modify this task")]
    Forbidden,
}

/// Mutations a caller can attempt on a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Create,
    UpdateStatus,
    Delete,
}

impl TaskAction {
    /// Whether the action is reserved for the owning identity
    pub fn requires_ownership(&self) -> bool {
        matches!(self, TaskAction::Delete)
    }
}

/// Checks that `user_id` is the owning identity
pub fn require_ownership(user_id: Uuid, owner: Uuid) -> Result<(), AuthzError> {
    if user_id != owner {
        return Err(AuthzError::Forbidden);
    }

    Ok(())
}

/// Decides whether the caller may perform `action` on `task`
pub fn authorize_task_mutation(
    auth: &AuthContext,
    task: &Task,
    action: TaskAction,
) -> Result<(), AuthzError> {
    if action.requires_ownership() {
        require_ownership(auth.user_id, task.assigned_by)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{AssignmentMode, TaskStatus};
    use chrono::Utc;

    fn task_owned_by(owner: Uuid) -> Task {
        Task {
            id: Uuid::new_v4(),
            name: "Task".to_string(),
            description: "Description".to_string(),
            assigned_to: AssignmentMode::Personal,
            assignee_email: None,
            status: TaskStatus::Pending,
            assigned_by: owner,
            created_at: Utc::now(),
        }
    }

    fn caller(user_id: Uuid) -> AuthContext {
        AuthContext {
            user_id,
            email: "caller@example.com".to_string(),
        }
    }

    #[test]
    fn test_require_ownership() {
        let id = Uuid::new_v4();
        assert!(require_ownership(id, id).is_ok());
        assert_eq!(
            require_ownership(id, Uuid::new_v4()),
            Err(AuthzError::Forbidden)
        );
    }

    #[test]
    fn test_owner_may_delete() {
        let owner = Uuid::new_v4();
        let task = task_owned_by(owner);

        assert!(authorize_task_mutation(&caller(owner), &task, TaskAction::Delete).is_ok());
    }

    #[test]
    fn test_non_owner_may_not_delete() {
        let task = task_owned_by(Uuid::new_v4());

        let result = authorize_task_mutation(&caller(Uuid::new_v4()), &task, TaskAction::Delete);
        assert_eq!(result, Err(AuthzError::Forbidden));
    }

    #[test]
    fn test_any_caller_may_update_status() {
        let task = task_owned_by(Uuid::new_v4());
        let stranger = caller(Uuid::new_v4());

        assert!(authorize_task_mutation(&stranger, &task, TaskAction::UpdateStatus).is_ok());
        assert!(authorize_task_mutation(&stranger, &task, TaskAction::Create).is_ok());
    }

    #[test]
    fn test_requires_ownership() {
        assert!(TaskAction::Delete.requires_ownership());
        assert!(!TaskAction::UpdateStatus.requires_ownership());
        assert!(!TaskAction::Create.requires_ownership());
    }
}
