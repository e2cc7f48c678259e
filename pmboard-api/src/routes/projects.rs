/// Project endpoints
///
/// Projects are visible to every authenticated user. Only the owner may
/// change a project, list its tasks, or read its summary; a non-owner asking
/// for the task list gets 404. Deleting a project cascades to its tasks,
/// their time logs and comments, and the project's own comments.

use super::Pagination;
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
    models::{
        project::{CreateProject, Project, ProjectPatch},
        task::{Task, TaskFilter, TaskWithAssignee},
        user::User,
    },
    reporting::{self, ProjectSummary},
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Loads a project or fails with 404
pub(crate) async fn load_project(pool: &PgPool, id: Uuid) -> ApiResult<Project> {
    Project::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))
}

/// Loads a project the user owns; 404 if absent, 403 otherwise
async fn load_owned_project(
    pool: &PgPool,
    id: Uuid,
    user: &User,
    action: &str,
) -> ApiResult<Project> {
    let project = load_project(pool, id).await?;

    if project.owner_id != user.id {
        return Err(ApiError::Forbidden(format!(
            "You don't have permission to {} this project",
            action
        )));
    }

    Ok(project)
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list(&state.db, page.limit(), page.offset()).await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateProject>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = Project::create(&state.db, user.id, req).await?;
    info!(project_id = %project.id, owner_id = %user.id, "Project created");

    Ok(Json(project))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(load_project(&state.db, id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> ApiResult<Json<Project>> {
    patch.validate()?;

    let mut project = load_owned_project(&state.db, id, &user, "update").await?;
    patch.apply_to(&mut project);

    let saved = Project::save(&state.db, &project).await?;
    info!(project_id = %saved.id, "Project updated");

    Ok(Json(saved))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let project = load_owned_project(&state.db, id, &user, "delete").await?;

    if !Project::delete(&state.db, project.id).await? {
        return Err(ApiError::not_found("Project"));
    }
    info!(project_id = %project.id, "Project deleted");

    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

/// Tasks of a project the caller owns; other users get 404
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<TaskWithAssignee>>> {
    let project = load_project(&state.db, id).await?;
    if project.owner_id != user.id {
        return Err(ApiError::not_found("Project"));
    }

    let filter = TaskFilter {
        project_id: Some(project.id),
        assignee_id: None,
    };
    let tasks = Task::list(&state.db, &filter, page.limit(), page.offset()).await?;

    Ok(Json(tasks))
}

/// Status breakdown, completion percentage, health, and hour totals
pub async fn project_summary(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectSummary>> {
    let project = load_owned_project(&state.db, id, &user, "view").await?;
    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(Json(reporting::project_summary(&project, &tasks)))
}
