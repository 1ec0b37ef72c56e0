/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and logout
/// - `profile`: The caller's own user record
/// - `tasks`: Task creation, listing, status updates and deletion

pub mod auth;
pub mod health;
pub mod profile;
pub mod tasks;
