/// Database models for pmboard
///
/// Each model owns its CRUD operations and the request payloads that create or
/// patch it.
///
/// # Models
///
/// - `user`: Accounts, login lookup
/// - `project`: Projects and their owner-only mutations
/// - `task`: Tasks, status/priority enums, partial updates
/// - `time_log`: Logged hours and the `actual_hours` accumulator
/// - `comment`: Comments on a task or a project
/// - `patch`: Unset-vs-null support for partial updates
///
/// # Example
///
/// ```no_run
/// use pmboard_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, owner_id, CreateProject {
///     title: "AI-Powered Analytics Dashboard".to_string(),
///     description: None,
///     status: "active".to_string(),
///     start_date: None,
///     end_date: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod patch;
pub mod project;
pub mod task;
pub mod time_log;
pub mod user;
