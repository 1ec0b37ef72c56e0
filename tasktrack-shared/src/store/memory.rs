/// In-memory storage backend
///
/// Keeps users and tasks in `HashMap`s behind a single `RwLock`. Uniqueness of
/// usernames and emails is enforced on insert just like the database
/// constraints. Used by the test suites and for running the API without
/// PostgreSQL.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasktrack_shared::store::{CredentialStore, MemoryStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// assert!(!store.identity_exists("ada", "ada@example.com").await?);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, StoreError, TaskRepository};
use crate::models::task::{AssignmentMode, NewTask, Task, TaskStatus, VisibleTask, UNKNOWN_OWNER};
use crate::models::user::{CreateUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    tasks: HashMap<Uuid, Task>,
}

/// Storage backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user, leaving their tasks behind
    pub async fn remove_user(&self, id: Uuid) -> bool {
        self.tables.write().await.users.remove(&id).is_some()
    }
}

fn is_visible(task: &Task, owner: Uuid, email: &str) -> bool {
    task.assignee_email.as_deref() == Some(email)
        || (task.assigned_to == AssignmentMode::Personal && task.assigned_by == owner)
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn identity_exists(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn insert_user(&self, user: CreateUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("users_username_key".to_string()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("users_email_key".to_string()));
        }

        let stored = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            username: user.username,
            gender: user.gender,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let stored = Task {
            id: Uuid::new_v4(),
            name: task.name,
            description: task.description,
            assigned_to: task.assigned_to,
            assignee_email: task.assignee_email,
            status: TaskStatus::Pending,
            assigned_by: task.owner,
            created_at: Utc::now(),
        };

        self.tables
            .write()
            .await
            .tasks
            .insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn list_visible(
        &self,
        owner: Uuid,
        email: &str,
    ) -> Result<Vec<VisibleTask>, StoreError> {
        let tables = self.tables.read().await;

        let mut visible: Vec<VisibleTask> = tables
            .tasks
            .values()
            .filter(|t| is_visible(t, owner, email))
            .map(|t| VisibleTask {
                task: t.clone(),
                assigned_by_email: tables
                    .users
                    .get(&t.assigned_by)
                    .map(|u| u.email.clone())
                    .unwrap_or_else(|| UNKNOWN_OWNER.to_string()),
            })
            .collect();

        visible.sort_by(|a, b| b.task.created_at.cmp(&a.task.created_at));
        Ok(visible)
    }

    async fn set_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;

        Ok(tables.tasks.get_mut(&id).map(|task| {
            task.status = status;
            task.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }

    async fn count_personal_by_owner(&self, owner: Uuid) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let count = tables
            .tasks
            .values()
            .filter(|t| t.assigned_to == AssignmentMode::Personal && t.assigned_by == owner)
            .count();

        Ok(count as i64)
    }

    async fn count_by_assignee_email(&self, email: &str) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let count = tables
            .tasks
            .values()
            .filter(|t| t.assignee_email.as_deref() == Some(email))
            .count();

        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Gender;

    fn create_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            full_name: "Test User".to_string(),
            username: username.to_string(),
            gender: Gender::Other,
            email: email.to_string(),
            password_hash: "$argon2id$v=19$hash".to_string(),
        }
    }

    fn personal(owner: Uuid) -> NewTask {
        NewTask {
            owner,
            name: "Personal".to_string(),
            description: "Mine".to_string(),
            assigned_to: AssignmentMode::Personal,
            assignee_email: None,
        }
    }

    #[tokio::test]
    async fn test_insert_user_rejects_duplicates() {
        let store = MemoryStore::new();
        store
            .insert_user(create_user("ada", "ada@example.com"))
            .await
            .unwrap();

        let by_username = store
            .insert_user(create_user("ada", "other@example.com"))
            .await;
        assert!(matches!(by_username, Err(StoreError::Duplicate(c)) if c == "users_username_key"));

        let by_email = store
            .insert_user(create_user("other", "ada@example.com"))
            .await;
        assert!(matches!(by_email, Err(StoreError::Duplicate(c)) if c == "users_email_key"));
    }

    #[tokio::test]
    async fn test_identity_exists() {
        let store = MemoryStore::new();
        store
            .insert_user(create_user("ada", "ada@example.com"))
            .await
            .unwrap();

        assert!(store.identity_exists("ada", "x@example.com").await.unwrap());
        assert!(store.identity_exists("x", "ada@example.com").await.unwrap());
        assert!(!store.identity_exists("x", "x@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_new_task_is_pending() {
        let store = MemoryStore::new();
        let task = store.insert_task(personal(Uuid::new_v4())).await.unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(store.find_task(task.id).await.unwrap(), Some(task));
    }

    #[tokio::test]
    async fn test_set_status_missing_task() {
        let store = MemoryStore::new();
        let result = store
            .set_status(Uuid::new_v4(), TaskStatus::Completed)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_visible_unknown_owner() {
        let store = MemoryStore::new();
        let owner = store
            .insert_user(create_user("ada", "ada@example.com"))
            .await
            .unwrap();
        store.insert_task(personal(owner.id)).await.unwrap();

        assert!(store.remove_user(owner.id).await);

        let visible = store.list_visible(owner.id, &owner.email).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].assigned_by_email, UNKNOWN_OWNER);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let store = MemoryStore::new();
        let task = store.insert_task(personal(Uuid::new_v4())).await.unwrap();

        assert!(store.delete_task(task.id).await.unwrap());
        assert!(!store.delete_task(task.id).await.unwrap());
    }
}
