/// Authentication endpoints
///
/// - `POST /register` - Register a new user
/// - `POST /login` - Exchange credentials for a session token
/// - `POST /logout` - End the session (client discards the token)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasktrack_shared::{
    auth::{middleware::AuthContext, password::validate_password_length},
    models::user::{normalize_email, Gender, Registration},
};
use validator::{Validate, ValidationError};

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Full name is required"))]
    pub full_name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Username is required"))]
    pub username: String,

    /// "male", "female" or "other"
    #[serde(default)]
    #[validate(custom(function = "valid_gender", message = "Invalid gender"))]
    pub gender: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(
        function = "long_enough",
        message = "Password must be at least 6 characters long"
    ))]
    pub password: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,

    /// Session token for the `Authorization: Bearer` header (7 days)
    pub token: String,

    pub expires_at: DateTime<Utc>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn valid_gender(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Gender>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("gender"))
}

fn long_enough(value: &str) -> Result<(), ValidationError> {
    validate_password_length(value).map_err(|_| ValidationError::new("length"))
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/json
///
/// {
///   "fullName": "Ada Lovelace",
///   "username": "ada",
///   "gender": "female",
///   "email": "ada@example.com",
///   "password": "analytical"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "message": "User registered successfully" }`
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, validation failed, or username/email
///   already taken
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(mut req) = payload?;
    req.email = normalize_email(&req.email);
    req.validate()?;

    let gender = req
        .gender
        .parse::<Gender>()
        .map_err(|e| ApiError::field("gender", e))?;

    state
        .authenticator
        .register(Registration {
            full_name: req.full_name.trim().to_string(),
            username: req.username.trim().to_string(),
            gender,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("User registered successfully"),
    ))
}

/// Login with email and password
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "analytical" }
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Login successful", "token": "eyJ...", "expiresAt": "2025-01-08T12:00:00Z" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or invalid email or password
///   (the two cases are indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(mut req) = payload?;
    req.email = normalize_email(&req.email);
    req.validate()?;

    let session = state.authenticator.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// Logout
///
/// Requires a valid token. Nothing is invalidated server-side; the token
/// stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Json<MessageResponse> {
    state.authenticator.logout(&auth);
    MessageResponse::new("Logout successful")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            full_name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
            gender: "female".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
        }
    }

    fn invalid_fields(req: &RegisterRequest) -> Vec<String> {
        let mut fields: Vec<String> = req
            .validate()
            .unwrap_err()
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        fields
    }

    #[test]
    fn test_valid_register_request() {
        assert!(register_request().validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_bad_fields() {
        let req = RegisterRequest {
            full_name: "  ".to_string(),
            gender: "unknown".to_string(),
            password: "12345".to_string(),
            ..register_request()
        };

        let fields = invalid_fields(&req);
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(&"gender".to_string()));
        assert!(fields.contains(&"password".to_string()));
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let req = RegisterRequest {
            email: "not-an-email".to_string(),
            ..register_request()
        };

        assert_eq!(invalid_fields(&req), vec!["email"]);
    }

    #[test]
    fn test_login_request_requires_password() {
        let req = LoginRequest {
            email: "ada@example.com".to_string(),
            password: String::new(),
        };

        assert!(req.validate().is_err());
    }
}
