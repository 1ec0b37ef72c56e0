/// Request token verification
///
/// Extracts the session token from the `Authorization: Bearer <token>` header
/// and validates it. Verification only checks the signature, issuer and
/// expiry; the credential store is never consulted.
///
/// The API crate wires [`verify_request`] into an axum middleware that puts
/// the resulting [`AuthContext`] into the request extensions.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use tasktrack_shared::auth::jwt::{create_token, Claims};
/// use tasktrack_shared::auth::middleware::verify_request;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id, "user@example.com"), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
///
/// let auth = verify_request(&headers, secret)?;
/// assert_eq!(auth.user_id, user_id);
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};

/// Verified identity of the caller, added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Subject of the session token
    pub user_id: Uuid,

    /// Normalized email carried by the token
    pub email: String,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Error type for token verification
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on the request
    #[error("Missing authentication token")]
    MissingToken,

    /// Signature, issuer or expiry check failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Pulls the bearer token out of the Authorization header
///
/// A missing header, a non-Bearer scheme and an empty token all count as a
/// missing token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

/// Verifies the token presented on a request
///
/// # Errors
///
/// - `AuthError::MissingToken` when there is no bearer token
/// - `AuthError::InvalidToken` when the token is forged, foreign or expired
pub fn verify_request(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Signature verification failed".to_string()),
    })?;

    Ok(AuthContext::from_claims(claims))
}
