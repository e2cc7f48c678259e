/// Time logging endpoints
///
/// Any authenticated user may log time against an existing task. Only the
/// author of a log may change or delete it; the author and the project owner
/// may read it. Every write recomputes the task's `actual_hours` in the same
/// transaction.

use super::{projects::load_project, Pagination};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use pmboard_shared::{
    auth::middleware::CurrentUser,
    models::{
        task::Task,
        time_log::{CreateTimeLog, TaskHours, TimeLog, TimeLogFilter, TimeLogPatch, TimeLogWithTask},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Optional inclusive date range
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Period {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Hours a user logged, grouped by task
#[derive(Debug, Serialize)]
pub struct UserTimeSummary {
    pub user_id: Uuid,
    pub total_hours: f64,
    pub task_summary: Vec<TaskHours>,
    pub period: Period,
}

async fn load_task(pool: &PgPool, id: Uuid) -> ApiResult<Task> {
    Task::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))
}

async fn load_time_log(pool: &PgPool, id: Uuid) -> ApiResult<TimeLog> {
    TimeLog::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Time log"))
}

/// Loads a log and checks the caller wrote it
async fn load_authored(pool: &PgPool, id: Uuid, user: &User, action: &str) -> ApiResult<TimeLog> {
    let log = load_time_log(pool, id).await?;

    if log.user_id != user.id {
        return Err(ApiError::Forbidden(format!(
            "Not authorized to {} this time log",
            action
        )));
    }

    Ok(log)
}

async fn log_time(
    pool: &PgPool,
    task_id: Uuid,
    user: &User,
    req: CreateTimeLog,
) -> ApiResult<TimeLog> {
    req.validate()?;
    let task = load_task(pool, task_id).await?;

    let log = TimeLog::create(pool, task.id, user.id, req).await?;
    info!(
        time_log_id = %log.id,
        task_id = %task.id,
        user_id = %user.id,
        hours = log.hours,
        "Time logged"
    );

    Ok(log)
}

pub async fn create_time_log(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTimeLog>,
) -> ApiResult<Json<TimeLog>> {
    let task_id = req
        .task_id
        .ok_or_else(|| ApiError::BadRequest("task_id is required".to_string()))?;

    Ok(Json(log_time(&state.db, task_id, &user, req).await?))
}

pub async fn list_time_logs(
    State(state): State<AppState>,
    Query(filter): Query<TimeLogFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<TimeLogWithTask>>> {
    let logs = TimeLog::list(&state.db, &filter, page.limit(), page.offset()).await?;
    Ok(Json(logs))
}

pub async fn get_time_log(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TimeLogWithTask>> {
    let log = TimeLog::find_with_task(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Time log"))?;

    if log.log.user_id != user.id {
        let task = load_task(&state.db, log.log.task_id).await?;
        let project = load_project(&state.db, task.project_id).await?;
        if project.owner_id != user.id {
            return Err(ApiError::Forbidden(
                "Not authorized to view this time log".to_string(),
            ));
        }
    }

    Ok(Json(log))
}

pub async fn update_time_log(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TimeLogPatch>,
) -> ApiResult<Json<TimeLog>> {
    patch.validate()?;

    let mut log = load_authored(&state.db, id, &user, "update").await?;
    patch.apply_to(&mut log);

    let saved = TimeLog::update(&state.db, &log).await?;
    info!(time_log_id = %saved.id, task_id = %saved.task_id, "Time log updated");

    Ok(Json(saved))
}

pub async fn delete_time_log(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let log = load_authored(&state.db, id, &user, "delete").await?;

    TimeLog::delete(&state.db, &log).await?;
    info!(time_log_id = %log.id, task_id = %log.task_id, "Time log deleted");

    Ok(Json(json!({ "message": "Time log deleted successfully" })))
}

/// Per-task totals for one user, optionally bounded by `start_date`/`end_date`
pub async fn user_time_summary(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(period): Query<Period>,
) -> ApiResult<Json<UserTimeSummary>> {
    let task_summary =
        TimeLog::user_summary(&state.db, user_id, period.start_date, period.end_date).await?;

    Ok(Json(summarize(user_id, task_summary, period)))
}

fn summarize(user_id: Uuid, task_summary: Vec<TaskHours>, period: Period) -> UserTimeSummary {
    UserTimeSummary {
        user_id,
        total_hours: task_summary.iter().map(|t| t.total_hours).sum(),
        task_summary,
        period,
    }
}

pub async fn list_task_time_logs(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TimeLog>>> {
    let task = load_task(&state.db, task_id).await?;
    Ok(Json(TimeLog::list_by_task(&state.db, task.id).await?))
}

/// `POST /tasks/{id}/time-logs`; the path wins over any `task_id` in the body
pub async fn create_task_time_log(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CreateTimeLog>,
) -> ApiResult<Json<TimeLog>> {
    Ok(Json(log_time(&state.db, task_id, &user, req).await?))
}
