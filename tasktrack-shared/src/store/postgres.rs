/// PostgreSQL storage backend
///
/// Thin adapter from the storage traits to the model queries.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, StoreError, TaskRepository};
use crate::db::pool::health_check;
use crate::models::task::{NewTask, Task, TaskStatus, VisibleTask};
use crate::models::user::{CreateUser, User};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Storage backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique constraint violations to `StoreError::Duplicate`
fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().is_some_and(|code| code.as_ref() == UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unique constraint").to_string();
            return StoreError::Duplicate(constraint);
        }
    }

    StoreError::Database(err)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn identity_exists(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        Ok(User::exists_by_username_or_email(&self.pool, username, email).await?)
    }

    async fn insert_user(&self, user: CreateUser) -> Result<User, StoreError> {
        User::create(&self.pool, user).await.map_err(map_insert_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        Ok(Task::create(&self.pool, task).await?)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_visible(
        &self,
        owner: Uuid,
        email: &str,
    ) -> Result<Vec<VisibleTask>, StoreError> {
        Ok(Task::list_visible(&self.pool, owner, email).await?)
    }

    async fn set_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>, StoreError> {
        Ok(Task::update_status(&self.pool, id, status).await?)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn count_personal_by_owner(&self, owner: Uuid) -> Result<i64, StoreError> {
        Ok(Task::count_personal_by_owner(&self.pool, owner).await?)
    }

    async fn count_by_assignee_email(&self, email: &str) -> Result<i64, StoreError> {
        Ok(Task::count_by_assignee_email(&self.pool, email).await?)
    }
}
