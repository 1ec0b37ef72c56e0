/// Session token issuance and validation
///
/// Session tokens are JWTs signed with HS256 (HMAC-SHA256) using the
/// server-held secret. A token carries the subject's user id and email and
/// expires seven days after issuance. Nothing is stored server-side: a token
/// is valid exactly when its signature checks out and it has not expired.
///
/// # Security
///
/// - **Algorithm**: HS256
/// - **Lifetime**: 7 days, no refresh and no revocation
/// - **Validation**: signature, expiration, not-before and issuer
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, "user@example.com");
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, user_id);
/// assert_eq!(validated.email, "user@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on every session token
pub const ISSUER: &str = "tasktrack";

/// Session token lifetime in days
pub const SESSION_TTL_DAYS: i64 = 7;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Session lifetime as a duration
pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "tasktrack")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `email`: Normalized email of the subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Subject email (custom claim)
    pub email: String,

    /// Issuer - Always "tasktrack"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims issued now, expiring after the session lifetime
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        Self::issued_at(user_id, email, Utc::now())
    }

    /// Creates claims as if issued at `issued_at`
    ///
    /// Expiration is always `issued_at` plus the session lifetime.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use tasktrack_shared::auth::jwt::Claims;
    /// use uuid::Uuid;
    ///
    /// let issued = Utc::now() - Duration::days(8);
    /// let claims = Claims::issued_at(Uuid::new_v4(), "user@example.com", issued);
    /// assert!(claims.is_expired());
    /// ```
    pub fn issued_at(user_id: Uuid, email: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        let expiration = issued_at + session_ttl();

        Self {
            sub: user_id,
            email: email.into(),
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
            nbf: issued_at.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Expiration as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Creates a signed JWT from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// Verifies:
/// - Signature is valid for `secret`
/// - Token hasn't expired
/// - Issuer is "tasktrack"
/// - Token is not used before its nbf time
///
/// # Errors
///
/// - `JwtError::Expired` when the expiration has passed
/// - `JwtError::InvalidIssuer` when the issuer does not match
/// - `JwtError::ValidationError` for bad signatures and malformed tokens
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_session_ttl_is_seven_days() {
        assert_eq!(session_ttl(), Duration::days(7));
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "user@example.com");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.iss, "tasktrack");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_time_until_expiration() {
        let claims = Claims::new(Uuid::new_v4(), "user@example.com");

        let time_left = claims.time_until_expiration().unwrap();
        assert!(time_left > Duration::days(7) - Duration::minutes(1));
        assert!(time_left <= Duration::days(7));
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "user@example.com");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated, claims);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), "user@example.com");
        let token = create_token(&claims, "secret-one-that-is-32-chars-long").unwrap();

        let result = validate_token(&token, "secret-two-that-is-32-chars-long");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_garbage_token() {
        let result = validate_token("invalid.token.here", SECRET);
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_token_valid_six_days_after_issue() {
        let issued = Utc::now() - Duration::days(6);
        let claims = Claims::issued_at(Uuid::new_v4(), "user@example.com", issued);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(validate_token(&token, SECRET).is_ok());
    }

    #[test]
    fn test_token_expired_eight_days_after_issue() {
        let issued = Utc::now() - Duration::days(8);
        let claims = Claims::issued_at(Uuid::new_v4(), "user@example.com", issued);

        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), "user@example.com");
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::InvalidIssuer { .. })));
    }

    #[test]
    fn test_expires_at_matches_exp() {
        let claims = Claims::new(Uuid::new_v4(), "user@example.com");
        assert_eq!(claims.expires_at().unwrap().timestamp(), claims.exp);
    }
}
