/// Task model and database operations
///
/// A task lives under a project and may be assigned to a user. Its
/// `actual_hours` is an accumulator kept equal to the sum of its time logs
/// (see [`crate::models::time_log`]).
///
/// # Status flow
///
/// ```text
/// todo → in_progress → review → ready_to_test → in_test → closed
/// ```
///
/// Any status may be set directly; `closed` is the completed state and is
/// what completion notifications and reporting look for.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM (
///     'todo', 'in_progress', 'review', 'ready_to_test', 'in_test', 'closed'
/// );
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'urgent');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     estimated_hours DOUBLE PRECISION,
///     actual_hours DOUBLE PRECISION NOT NULL DEFAULT 0,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use pmboard_shared::models::task::{CreateTask, Task, TaskPatch, TaskStatus};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let mut task = Task::create(&pool, CreateTask {
///     title: "Design Dashboard Layout".to_string(),
///     description: None,
///     status: TaskStatus::Todo,
///     priority: Default::default(),
///     estimated_hours: Some(15.0),
///     project_id,
///     assignee_id: Some(user_id),
/// }).await?;
///
/// TaskPatch { status: Some(TaskStatus::InProgress), ..Default::default() }.apply_to(&mut task);
/// let task = Task::save(&pool, &task, None).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::patch::double_option;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    ReadyToTest,
    InTest,
    /// The completed state
    Closed,
}

impl TaskStatus {
    /// Every status in workflow order
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::ReadyToTest,
        TaskStatus::InTest,
        TaskStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::ReadyToTest => "ready_to_test",
            TaskStatus::InTest => "in_test",
            TaskStatus::Closed => "closed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Closed)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub estimated_hours: Option<f64>,

    /// Sum of logged hours
    pub actual_hours: f64,

    pub project_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,

    /// NULL until the first update
    pub updated_at: Option<DateTime<Utc>>,
}

/// Task joined with its assignee's display fields
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskWithAssignee {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,

    pub assignee_name: Option<String>,
    pub assignee_username: Option<String>,
}

/// Payload for creating a task
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    #[validate(range(min = 0.0, message = "Estimated hours cannot be negative"))]
    pub estimated_hours: Option<f64>,

    pub project_id: Uuid,

    /// Defaults to the creator when omitted
    pub assignee_id: Option<Uuid>,
}

/// Partial update for a task
///
/// Absent keys leave the field untouched. For the nullable columns
/// (`description`, `estimated_hours`, `assignee_id`) an explicit `null`
/// clears the value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_task_patch"))]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "double_option")]
    pub estimated_hours: Option<Option<f64>>,

    pub actual_hours: Option<f64>,
    pub project_id: Option<Uuid>,

    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,
}

fn validate_task_patch(patch: &TaskPatch) -> Result<(), ValidationError> {
    let negative = |hours: f64| !hours.is_finite() || hours < 0.0;

    if patch.estimated_hours.flatten().is_some_and(negative)
        || patch.actual_hours.is_some_and(negative)
    {
        let mut err = ValidationError::new("hours");
        err.message = Some("Hours must be a non-negative number".into());
        return Err(err);
    }

    Ok(())
}

impl TaskPatch {
    /// Whether the payload supplies no fields at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.estimated_hours.is_none()
            && self.actual_hours.is_none()
            && self.project_id.is_none()
            && self.assignee_id.is_none()
    }

    /// Applies every supplied field to `task`
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(estimated_hours) = self.estimated_hours {
            task.estimated_hours = estimated_hours;
        }
        if let Some(actual_hours) = self.actual_hours {
            task.actual_hours = actual_hours;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
    }
}

/// Filters for task listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

impl Task {
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, priority, estimated_hours,
                               project_id, assignee_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.estimated_hours)
        .bind(data.project_id)
        .bind(data.assignee_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_assignee(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        sqlx::query_as::<_, TaskWithAssignee>(
            r#"
            SELECT t.*, COALESCE(u.full_name, u.username) AS assignee_name,
                   u.username AS assignee_username
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assignee_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists tasks matching `filter`, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        sqlx::query_as::<_, TaskWithAssignee>(
            r#"
            SELECT t.*, COALESCE(u.full_name, u.username) AS assignee_name,
                   u.username AS assignee_username
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assignee_id
            WHERE ($1::uuid IS NULL OR t.project_id = $1)
              AND ($2::uuid IS NULL OR t.assignee_id = $2)
            ORDER BY t.created_at DESC, t.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.project_id)
        .bind(filter.assignee_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Every task, for reporting snapshots
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks ORDER BY created_at, id")
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE project_id = $1 ORDER BY created_at, id")
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Writes the editable columns of `task` back and bumps `updated_at`
    ///
    /// `actual_hours` is owned by the time-log accumulator and is only
    /// overwritten when `actual_hours` is `Some`, so a stale snapshot never
    /// rolls back hours logged since it was read.
    pub async fn save(
        pool: &PgPool,
        task: &Task,
        actual_hours: Option<f64>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, priority = $5,
                estimated_hours = $6, actual_hours = COALESCE($7, actual_hours),
                project_id = $8, assignee_id = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.estimated_hours)
        .bind(actual_hours)
        .bind(task.project_id)
        .bind(task.assignee_id)
        .fetch_one(pool)
        .await
    }

    /// Deletes a task; its time logs and comments go with it
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Task counts per status for tasks matching `filter`
    ///
    /// Statuses with no tasks are absent from the result.
    pub async fn status_counts(
        pool: &PgPool,
        filter: &TaskFilter,
    ) -> Result<Vec<(TaskStatus, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (TaskStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM tasks
            WHERE ($1::uuid IS NULL OR project_id = $1)
              AND ($2::uuid IS NULL OR assignee_id = $2)
            GROUP BY status
            "#,
        )
        .bind(filter.project_id)
        .bind(filter.assignee_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
