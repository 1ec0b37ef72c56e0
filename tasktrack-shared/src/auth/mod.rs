/// Authentication and authorization for TaskTrack
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: Session token issuance and validation
/// - [`middleware`]: Extracting and verifying the bearer token of a request
/// - [`authorization`]: Ownership checks on task mutations
/// - [`authenticator`]: Registration, login and logout
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::password::{hash_password, verify_password};
/// use tasktrack_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "user@example.com");
/// let token = create_token(&claims, "secret-key-that-is-at-least-32-chars")?;
/// # Ok(())
/// # }
/// ```

pub mod authenticator;
pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
