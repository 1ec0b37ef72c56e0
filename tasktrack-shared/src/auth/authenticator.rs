/// Registration, login and logout
///
/// The [`Authenticator`] owns the credential flow:
///
/// 1. **Register**: normalize the email, reject taken usernames or emails,
///    hash the password and store the identity
/// 2. **Login**: look the identity up by normalized email, verify the
///    password and issue a 7-day session token
/// 3. **Logout**: nothing to invalidate server-side; the client discards the
///    token, which stays valid until it expires
///
/// Password hashing is CPU-bound and runs on the blocking thread pool.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasktrack_shared::auth::authenticator::Authenticator;
/// use tasktrack_shared::models::user::{Gender, Registration};
/// use tasktrack_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = Authenticator::new(Arc::new(MemoryStore::new()), "secret-key-that-is-at-least-32-chars");
///
/// auth.register(Registration {
///     full_name: "Ada Lovelace".into(),
///     username: "ada".into(),
///     gender: Gender::Female,
///     email: "Ada@Example.com".into(),
///     password: "analytical".into(),
/// })
/// .await?;
///
/// let session = auth.login("ada@example.com", "analytical").await?;
/// assert!(!session.token.is_empty());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::jwt::{create_token, Claims, JwtError};
use super::middleware::AuthContext;
use super::password::{hash_password, verify_password, PasswordError};
use crate::models::user::{normalize_email, CreateUser, Registration, User, UserProfile};
use crate::store::{CredentialStore, StoreError};

/// Error type for the credential flow
#[derive(Debug, thiserror::Error)]
pub enum AuthnError {
    /// Username or email already registered
    #[error("User with this email or username already exists")]
    DuplicateIdentity,

    /// Unknown email or wrong password; callers can't tell which
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(StoreError),

    /// Blocking task panicked or was cancelled
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthnError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AuthnError::DuplicateIdentity,
            other => AuthnError::Store(other),
        }
    }
}

/// Issued session token
#[derive(Debug, Clone)]
pub struct Session {
    /// Signed JWT
    pub token: String,

    pub expires_at: DateTime<Utc>,

    pub user_id: Uuid,
}

/// Verifies credentials and issues session tokens
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    secret: Arc<str>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, secret: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            secret: secret.into(),
        }
    }

    /// Registers a new identity
    ///
    /// The stored record never contains the plaintext password. Only the
    /// public profile is returned.
    ///
    /// # Errors
    ///
    /// `AuthnError::DuplicateIdentity` when the username or the normalized
    /// email is already taken.
    pub async fn register(&self, registration: Registration) -> Result<UserProfile, AuthnError> {
        let email = normalize_email(&registration.email);

        if self
            .store
            .identity_exists(&registration.username, &email)
            .await?
        {
            debug!(username = %registration.username, "Registration rejected: identity taken");
            return Err(AuthnError::DuplicateIdentity);
        }

        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthnError::Internal(format!("Password hashing task failed: {}", e)))??;

        let user = self
            .store
            .insert_user(CreateUser {
                full_name: registration.full_name,
                username: registration.username,
                gender: registration.gender,
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(UserProfile::from(user))
    }

    /// Verifies credentials and issues a session token
    ///
    /// # Errors
    ///
    /// `AuthnError::InvalidCredentials` for an unknown email and for a wrong
    /// password alike.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthnError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            debug!("Login failed: unknown email");
            return Err(AuthnError::InvalidCredentials);
        };

        let candidate = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&candidate, &hash))
            .await
            .map_err(|e| AuthnError::Internal(format!("Password check task failed: {}", e)))??;

        if !matches {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthnError::InvalidCredentials);
        }

        let claims = Claims::new(user.id, user.email);
        let token = create_token(&claims, &self.secret)?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| AuthnError::Internal("Token expiry out of range".to_string()))?;

        info!(user_id = %user.id, "User logged in");
        Ok(Session {
            token,
            expires_at,
            user_id: user.id,
        })
    }

    /// Ends a session
    ///
    /// Tokens are not tracked, so this only records the event. A leaked token
    /// remains usable until it expires.
    pub fn logout(&self, auth: &AuthContext) {
        info!(user_id = %auth.user_id, "User logged out");
    }

    /// Looks up the identity behind a verified token
    pub async fn current_user(&self, auth: &AuthContext) -> Result<Option<User>, AuthnError> {
        Ok(self.store.find_user_by_id(auth.user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_token;
    use crate::models::user::Gender;
    use crate::store::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(MemoryStore::new()), SECRET)
    }

    fn registration(username: &str, email: &str) -> Registration {
        Registration {
            full_name: "Ada Lovelace".to_string(),
            username: username.to_string(),
            gender: Gender::Female,
            email: email.to_string(),
            password: "analytical".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_normalizes_email_and_hashes_password() {
        let auth = authenticator();
        let profile = auth
            .register(registration("ada", "  Ada@Example.COM "))
            .await
            .unwrap();
        assert_eq!(profile.email, "ada@example.com");

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("passwordHash").is_none());

        let context = AuthContext {
            user_id: profile.id,
            email: profile.email.clone(),
        };
        let user = auth.current_user(&context).await.unwrap().unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_ne!(user.password_hash, "analytical");
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let auth = authenticator();
        auth.register(registration("ada", "ada@example.com"))
            .await
            .unwrap();

        let result = auth.register(registration("ada", "other@example.com")).await;
        assert!(matches!(result, Err(AuthnError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_subject() {
        let auth = authenticator();
        let user = auth
            .register(registration("ada", "ada@example.com"))
            .await
            .unwrap();

        let session = auth.login("ADA@example.com", "analytical").await.unwrap();
        let claims = validate_token(&session.token, SECRET).unwrap();

        assert_eq!(session.user_id, user.id);
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(session.expires_at.timestamp(), claims.exp);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = authenticator();
        auth.register(registration("ada", "ada@example.com"))
            .await
            .unwrap();

        let result = auth.login("ada@example.com", "wrong-password").await;
        assert!(matches!(result, Err(AuthnError::InvalidCredentials)));
    }

    #[test]
    fn test_duplicate_store_error_maps_to_duplicate_identity() {
        let err = AuthnError::from(StoreError::Duplicate("users_email_key".to_string()));
        assert!(matches!(err, AuthnError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn test_login_with_corrupt_stored_hash_is_internal() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_user(CreateUser {
                full_name: "Ada Lovelace".to_string(),
                username: "ada".to_string(),
                gender: Gender::Female,
                email: "ada@example.com".to_string(),
                password_hash: "$argon2id$invalid".to_string(),
            })
            .await
            .unwrap();

        let auth = Authenticator::new(store, SECRET);
        let result = auth.login("ada@example.com", "analytical").await;
        assert!(matches!(result, Err(AuthnError::Password(_))));
    }
}
