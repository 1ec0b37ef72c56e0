/// Middleware for the API server
///
/// - `security`: Security response headers
///
/// Token verification lives in `app::jwt_auth_layer` on top of
/// `tasktrack_shared::auth::middleware`.

pub mod security;
