/// Database models for TaskTrack
///
/// # Models
///
/// - `user`: Registered identities
/// - `task`: Tasks and their visibility queries
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::models::user::{CreateUser, Gender, User};
/// use tasktrack_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     full_name: "Ada Lovelace".to_string(),
///     username: "ada".to_string(),
///     gender: Gender::Female,
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};

pub mod task;
pub mod user;

/// A single invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as it appears in the request body
    pub field: String,

    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
