/// Dashboard performance metrics
///
/// ```text
/// GET /performance-metrics
/// ```
///
/// Computed from full snapshots of tasks and projects plus the total of all
/// logged hours; see [`pmboard_shared::reporting`] for the formulas.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use chrono::Utc;
use pmboard_shared::{
    models::{project::Project, task::Task, time_log::TimeLog},
    reporting::{self, PerformanceMetrics},
};
use tracing::debug;

pub async fn performance_metrics(
    State(state): State<AppState>,
) -> ApiResult<Json<PerformanceMetrics>> {
    let tasks = Task::list_all(&state.db).await?;
    let projects = Project::list_all(&state.db).await?;
    let total_logged_hours = TimeLog::total_hours(&state.db).await?;

    debug!(
        tasks = tasks.len(),
        projects = projects.len(),
        "Computing performance metrics"
    );

    Ok(Json(reporting::performance_metrics(
        &tasks,
        &projects,
        total_logged_hours,
        Utc::now(),
    )))
}
