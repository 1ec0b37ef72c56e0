/// Storage traits for users and tasks
///
/// Services talk to persistence through [`CredentialStore`] and
/// [`TaskRepository`] so they can run against PostgreSQL in production and
/// against an in-memory store in tests.
///
/// # Implementations
///
/// - [`PgStore`]: PostgreSQL via `sqlx`
/// - [`MemoryStore`]: `HashMap`s behind a `tokio` lock
///
/// Single-record operations are atomic; nothing spans multiple records, so a
/// concurrent status update and delete on the same task simply race.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskStatus, VisibleTask};
use crate::models::user::{CreateUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field (username or email) is already taken
    #[error("Duplicate value for {0}")]
    Duplicate(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persisted user identities
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether the username or the normalized email is taken
    async fn identity_exists(&self, username: &str, email: &str) -> Result<bool, StoreError>;

    /// Inserts a user
    ///
    /// Returns `StoreError::Duplicate` when a concurrent registration won the
    /// race for the same username or email.
    async fn insert_user(&self, user: CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Checks the store is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Persisted tasks
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a validated task as pending
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Tasks assigned to `email` plus personal tasks owned by `owner`, newest
    /// first, each with the owner's email resolved
    async fn list_visible(&self, owner: Uuid, email: &str)
        -> Result<Vec<VisibleTask>, StoreError>;

    /// Overwrites the status; `None` if the task doesn't exist
    async fn set_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>, StoreError>;

    /// Removes a task; false if it didn't exist
    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Number of personal tasks owned by `owner`
    async fn count_personal_by_owner(&self, owner: Uuid) -> Result<i64, StoreError>;

    /// Number of tasks assigned to `email`
    async fn count_by_assignee_email(&self, email: &str) -> Result<i64, StoreError>;
}
