/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Root info and health check
/// - `seed`: Demo data status and loading
/// - `auth`: Registration and login
/// - `users`: Current user profile and user directory
/// - `projects`: Project CRUD, project tasks, project summary
/// - `tasks`: Task CRUD, the update lifecycle, personal task views
/// - `timelog`: Time logging and per-user summaries
/// - `comments`: Comments on tasks and projects
/// - `metrics`: Dashboard performance metrics

pub mod auth;
pub mod comments;
pub mod health;
pub mod metrics;
pub mod projects;
pub mod seed;
pub mod tasks;
pub mod timelog;
pub mod users;

use serde::Deserialize;

/// Upper bound for `limit` on every list endpoint
pub const MAX_PAGE_SIZE: i64 = 1000;

const DEFAULT_PAGE_SIZE: i64 = 100;

/// `?skip=&limit=` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Row limit, clamped to `0..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> i64 {
        self.limit.clamp(0, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.skip.max(0)
    }
}
