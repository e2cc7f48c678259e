/// Time log model and database operations
///
/// A time log records hours a user worked on a task on a given business date.
/// The owning task's `actual_hours` is derived from these rows:
///
/// ```text
/// task.actual_hours == SUM(time_logs.hours WHERE task_id = task.id)
/// ```
///
/// [`TimeLog::create`], [`TimeLog::update`], and [`TimeLog::delete`] each run
/// the write and the recomputation in one transaction. Under READ COMMITTED two
/// concurrent writers on the same task can still commit a stale sum; the
/// recomputation is a single statement, not a serializable read-modify-write.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE time_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     hours DOUBLE PRECISION NOT NULL CHECK (hours >= 0),
///     description TEXT NOT NULL DEFAULT '',
///     work_date DATE NOT NULL DEFAULT CURRENT_DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

/// Time log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeLog {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub hours: f64,
    pub description: String,

    /// Business date of the work
    #[serde(rename = "date")]
    pub work_date: NaiveDate,

    pub created_at: DateTime<Utc>,
}

/// Time log joined with its task and project titles
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TimeLogWithTask {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub log: TimeLog,

    pub task_title: String,
    pub project_title: String,
}

/// Payload for logging time
///
/// `task_id` is required on `POST /timelog` and taken from the path on
/// `POST /tasks/{id}/time-logs`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimeLog {
    pub task_id: Option<Uuid>,

    #[validate(range(min = 0.0, message = "Hours cannot be negative"))]
    pub hours: f64,

    #[serde(default)]
    pub description: String,

    /// Defaults to today (UTC)
    pub date: Option<NaiveDate>,
}

/// Partial update for a time log
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TimeLogPatch {
    #[validate(range(min = 0.0, message = "Hours cannot be negative"))]
    pub hours: Option<f64>,

    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl TimeLogPatch {
    pub fn apply_to(self, log: &mut TimeLog) {
        if let Some(hours) = self.hours {
            log.hours = hours;
        }
        if let Some(description) = self.description {
            log.description = description;
        }
        if let Some(date) = self.date {
            log.work_date = date;
        }
    }
}

/// Filters for time log listings; date bounds are inclusive
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeLogFilter {
    pub task_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Hours a user logged against one task
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskHours {
    pub task_id: Uuid,
    pub task_title: String,
    pub project_title: String,
    pub total_hours: f64,
}

impl TimeLog {
    /// Inserts a time log and refreshes the task's `actual_hours`
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
        data: CreateTimeLog,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let log = sqlx::query_as::<_, TimeLog>(
            r#"
            INSERT INTO time_logs (task_id, user_id, hours, description, work_date)
            VALUES ($1, $2, $3, $4, COALESCE($5, CURRENT_DATE))
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(data.hours)
        .bind(data.description)
        .bind(data.date)
        .fetch_one(&mut *tx)
        .await?;

        recompute_actual_hours(&mut tx, task_id).await?;
        tx.commit().await?;

        Ok(log)
    }

    /// Writes `log` back and refreshes the task's `actual_hours`
    pub async fn update(pool: &PgPool, log: &TimeLog) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let saved = sqlx::query_as::<_, TimeLog>(
            r#"
            UPDATE time_logs
            SET hours = $2, description = $3, work_date = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(log.id)
        .bind(log.hours)
        .bind(&log.description)
        .bind(log.work_date)
        .fetch_one(&mut *tx)
        .await?;

        recompute_actual_hours(&mut tx, saved.task_id).await?;
        tx.commit().await?;

        Ok(saved)
    }

    /// Deletes `log` and refreshes the task's `actual_hours`
    pub async fn delete(pool: &PgPool, log: &TimeLog) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query("DELETE FROM time_logs WHERE id = $1")
            .bind(log.id)
            .execute(&mut *tx)
            .await?;

        recompute_actual_hours(&mut tx, log.task_id).await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeLog>("SELECT * FROM time_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_task(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TimeLogWithTask>, sqlx::Error> {
        sqlx::query_as::<_, TimeLogWithTask>(
            r#"
            SELECT l.*, t.title AS task_title, p.title AS project_title
            FROM time_logs l
            JOIN tasks t ON t.id = l.task_id
            JOIN projects p ON p.id = t.project_id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists logs matching `filter`, most recent work date first
    pub async fn list(
        pool: &PgPool,
        filter: &TimeLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimeLogWithTask>, sqlx::Error> {
        sqlx::query_as::<_, TimeLogWithTask>(
            r#"
            SELECT l.*, t.title AS task_title, p.title AS project_title
            FROM time_logs l
            JOIN tasks t ON t.id = l.task_id
            JOIN projects p ON p.id = t.project_id
            WHERE ($1::uuid IS NULL OR l.task_id = $1)
              AND ($2::uuid IS NULL OR l.user_id = $2)
              AND ($3::date IS NULL OR l.work_date >= $3)
              AND ($4::date IS NULL OR l.work_date <= $4)
            ORDER BY l.work_date DESC, l.created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.task_id)
        .bind(filter.user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeLog>(
            "SELECT * FROM time_logs WHERE task_id = $1 ORDER BY work_date DESC, created_at DESC",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    /// Per-task totals for one user within an optional inclusive date range
    pub async fn user_summary(
        pool: &PgPool,
        user_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<TaskHours>, sqlx::Error> {
        sqlx::query_as::<_, TaskHours>(
            r#"
            SELECT l.task_id, t.title AS task_title, p.title AS project_title,
                   SUM(l.hours) AS total_hours
            FROM time_logs l
            JOIN tasks t ON t.id = l.task_id
            JOIN projects p ON p.id = t.project_id
            WHERE l.user_id = $1
              AND ($2::date IS NULL OR l.work_date >= $2)
              AND ($3::date IS NULL OR l.work_date <= $3)
            GROUP BY l.task_id, t.title, p.title
            ORDER BY total_hours DESC, t.title
            "#,
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await
    }

    /// Sum of every logged hour
    pub async fn total_hours(pool: &PgPool) -> Result<f64, sqlx::Error> {
        let (total,): (f64,) =
            sqlx::query_as("SELECT COALESCE(SUM(hours), 0)::float8 FROM time_logs")
                .fetch_one(pool)
                .await?;

        Ok(total)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM time_logs")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

/// Sets `tasks.actual_hours` to the sum of the task's logs and returns it
pub async fn recompute_actual_hours(
    conn: &mut PgConnection,
    task_id: Uuid,
) -> Result<f64, sqlx::Error> {
    let (hours,): (f64,) = sqlx::query_as(
        r#"
        UPDATE tasks
        SET actual_hours = (
            SELECT COALESCE(SUM(hours), 0)::float8 FROM time_logs WHERE task_id = $1
        )
        WHERE id = $1
        RETURNING actual_hours
        "#,
    )
    .bind(task_id)
    .fetch_one(conn)
    .await?;

    Ok(hours)
}
