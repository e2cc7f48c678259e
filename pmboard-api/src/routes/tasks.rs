/// Task endpoints
///
/// Tasks are globally visible and may be updated by any authenticated user;
/// only the project owner may delete one.
///
/// # Update lifecycle
///
/// `PUT /tasks/{id}` snapshots the task, applies the patch, persists it, and
/// diffs the two versions. The diff picks at most one email (completion,
/// then reassignment, then a general update) which is dispatched on a
/// detached task so the response never waits on SMTP.

use super::{projects::load_project, Pagination};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use pmboard_shared::{
    auth::middleware::CurrentUser,
    lifecycle::TaskDiff,
    models::{
        task::{CreateTask, Task, TaskFilter, TaskPatch, TaskWithAssignee},
        user::User,
    },
    notify::{NotificationKind, TaskNotification},
    reporting::{MyTaskStats, StatusCounts},
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

async fn load_task(pool: &PgPool, id: Uuid) -> ApiResult<Task> {
    Task::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))
}

async fn load_with_assignee(pool: &PgPool, id: Uuid) -> ApiResult<TaskWithAssignee> {
    Task::find_with_assignee(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))
}

async fn load_assignee(pool: &PgPool, id: Uuid) -> ApiResult<User> {
    User::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignee"))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<TaskWithAssignee>>> {
    if let Some(project_id) = filter.project_id {
        load_project(&state.db, project_id).await?;
    }

    let tasks = Task::list(&state.db, &filter, page.limit(), page.offset()).await?;

    Ok(Json(tasks))
}

/// Create a task in any existing project
///
/// The assignee defaults to the creator. Assigning someone else sends them
/// an assignment email.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(mut req): Json<CreateTask>,
) -> ApiResult<Json<TaskWithAssignee>> {
    req.validate()?;

    let project = load_project(&state.db, req.project_id).await?;

    let assignee = match req.assignee_id {
        Some(id) if id != user.id => Some(load_assignee(&state.db, id).await?),
        _ => None,
    };
    req.assignee_id = Some(assignee.as_ref().map_or(user.id, |a| a.id));

    let task = Task::create(&state.db, req).await?;
    info!(
        task_id = %task.id,
        project_id = %project.id,
        assignee_id = ?task.assignee_id,
        "Task created"
    );

    if let Some(assignee) = assignee.filter(|a| !a.email.trim().is_empty()) {
        let notification = TaskNotification {
            kind: NotificationKind::Assignment {
                assigned_by: user.display_name().to_string(),
            },
            recipient_email: assignee.email.clone(),
            recipient_name: assignee.display_name().to_string(),
            task_id: task.id,
            task_title: task.title.clone(),
            project_title: project.title.clone(),
        };
        drop(state.notifier.dispatch(notification));
    }

    Ok(Json(load_with_assignee(&state.db, task.id).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskWithAssignee>> {
    Ok(Json(load_with_assignee(&state.db, id).await?))
}

/// Apply a partial update and fire the matching notification
///
/// # Errors
///
/// - `404 Not Found`: Task, target project, or assignee does not exist
/// - `422 Unprocessable Entity`: Invalid field values
/// - `500 Internal Server Error`: Persisting the update failed
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<TaskWithAssignee>> {
    patch.validate()?;

    let before = load_task(&state.db, id).await?;
    let current_project = load_project(&state.db, before.project_id).await?;

    let may_update =
        current_project.owner_id == user.id || before.assignee_id == Some(user.id);
    debug!(
        task_id = %before.id,
        user_id = %user.id,
        owner_or_assignee = may_update,
        "Task update authorization"
    );

    let project = match patch.project_id {
        Some(project_id) if project_id != current_project.id => {
            load_project(&state.db, project_id).await?
        }
        _ => current_project,
    };
    if let Some(Some(assignee_id)) = patch.assignee_id {
        load_assignee(&state.db, assignee_id).await?;
    }

    let actual_hours = patch.actual_hours;
    let mut task = before.clone();
    patch.apply_to(&mut task);

    let after = Task::save(&state.db, &task, actual_hours)
        .await
        .map_err(ApiError::internal)?;

    let diff = TaskDiff::between(&before, &after);
    let outcome = diff.outcome();
    info!(
        task_id = %after.id,
        user_id = %user.id,
        update_type = outcome.update_type(),
        changes = ?diff.labels(),
        "Task updated"
    );

    if let Some(notification) = outcome.notification(&user, &after, &project.title) {
        drop(state.notifier.dispatch(notification));
    }

    let response = Task::find_with_assignee(&state.db, after.id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Task"))?;

    Ok(Json(response))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let task = load_task(&state.db, id).await?;
    let project = load_project(&state.db, task.project_id).await?;

    if project.owner_id != user.id {
        return Err(ApiError::Forbidden(
            "You don't have permission to delete this task".to_string(),
        ));
    }

    Task::delete(&state.db, task.id).await?;
    info!(task_id = %task.id, project_id = %project.id, "Task deleted");

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

/// Tasks assigned to the caller
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<TaskWithAssignee>>> {
    let filter = TaskFilter {
        project_id: None,
        assignee_id: Some(user.id),
    };
    let tasks = Task::list(&state.db, &filter, page.limit(), page.offset()).await?;

    Ok(Json(tasks))
}

/// Per-status counts of the caller's tasks
pub async fn my_task_stats(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<MyTaskStats>> {
    let filter = TaskFilter {
        project_id: None,
        assignee_id: Some(user.id),
    };
    let pairs = Task::status_counts(&state.db, &filter).await?;

    Ok(Json(MyTaskStats::new(
        user.id,
        user.username.clone(),
        StatusCounts::from_pairs(&pairs),
    )))
}
