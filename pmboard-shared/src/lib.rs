//! # pmboard shared library
//!
//! Domain types and business logic behind the pmboard API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens, bearer authentication
//! - `db`: Connection pool, migrations, demo data
//! - `models`: Users, projects, tasks, time logs, comments
//! - `lifecycle`: Task update diffing and notification classification
//! - `notify`: Email templates, mail transports, background dispatch
//! - `reporting`: Dashboard and summary aggregates

pub mod auth;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod reporting;

/// Current version of the pmboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
