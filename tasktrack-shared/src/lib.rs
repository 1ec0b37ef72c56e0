//! # TaskTrack Shared Library
//!
//! This crate contains the domain types, authentication primitives and
//! storage layer used by the TaskTrack API server.
//!
//! ## Module Organization
//!
//! - `models`: Users and tasks, plus their PostgreSQL queries
//! - `auth`: Password hashing, session tokens, request verification,
//!   ownership checks and the login/registration flow
//! - `store`: Storage traits with PostgreSQL and in-memory backends
//! - `db`: Connection pool and migrations
//! - `tasks`: Task operations guarded by ownership rules

pub mod auth;
pub mod db;
pub mod models;
pub mod store;
pub mod tasks;

/// Current version of the TaskTrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
