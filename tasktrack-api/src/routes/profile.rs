/// Profile endpoint
///
/// ```text
/// GET /profile
/// Authorization: Bearer <token>
/// ```
///
/// Returns the caller's user record without credential material:
///
/// ```json
/// { "id": "uuid", "fullName": "Ada Lovelace", "username": "ada", "gender": "female", "email": "ada@example.com" }
/// ```
///
/// `404` when the token is valid but its subject no longer exists.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use tasktrack_shared::{auth::middleware::AuthContext, models::user::UserProfile};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let user = state
        .authenticator
        .current_user(&auth)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
