/// Comment endpoints
///
/// A comment belongs to exactly one task or one project. Anyone may comment
/// on an existing target; only the author may edit or delete a comment.

use super::projects::load_project;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use pmboard_shared::{
    auth::middleware::CurrentUser,
    models::{
        comment::{Comment, CommentContent, CommentTarget, CommentWithAuthor, CreateComment},
        task::Task,
        user::User,
    },
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Fails with 404 when the task or project does not exist
async fn ensure_target(pool: &PgPool, target: CommentTarget) -> ApiResult<()> {
    match target {
        CommentTarget::Task(id) => {
            Task::find_by_id(pool, id)
                .await?
                .ok_or_else(|| ApiError::not_found("Task"))?;
        }
        CommentTarget::Project(id) => {
            load_project(pool, id).await?;
        }
    }
    Ok(())
}

async fn load_with_author(pool: &PgPool, id: Uuid) -> ApiResult<CommentWithAuthor> {
    Comment::find_with_author(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))
}

async fn add_comment(
    pool: &PgPool,
    user: &User,
    target: CommentTarget,
    content: String,
) -> ApiResult<CommentWithAuthor> {
    ensure_target(pool, target).await?;

    let comment = Comment::create(pool, user.id, target, content).await?;
    info!(comment_id = %comment.id, author_id = %user.id, target = ?target, "Comment created");

    load_with_author(pool, comment.id).await
}

async fn comments_on(pool: &PgPool, target: CommentTarget) -> ApiResult<Vec<CommentWithAuthor>> {
    ensure_target(pool, target).await?;
    Ok(Comment::list_for(pool, target).await?)
}

/// Loads a comment and checks the caller wrote it
async fn load_authored(pool: &PgPool, id: Uuid, user: &User, action: &str) -> ApiResult<Comment> {
    let comment = Comment::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;

    if comment.author_id != user.id {
        return Err(ApiError::Forbidden(format!(
            "Not authorized to {} this comment",
            action
        )));
    }

    Ok(comment)
}

/// `POST /comments` with exactly one of `task_id` / `project_id`
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateComment>,
) -> ApiResult<Json<CommentWithAuthor>> {
    let target = req.target()?;
    req.validate()?;

    Ok(Json(add_comment(&state.db, &user, target, req.content).await?))
}

pub async fn list_task_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentWithAuthor>>> {
    Ok(Json(comments_on(&state.db, CommentTarget::Task(id)).await?))
}

pub async fn list_project_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentWithAuthor>>> {
    Ok(Json(comments_on(&state.db, CommentTarget::Project(id)).await?))
}

pub async fn create_task_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentContent>,
) -> ApiResult<Json<CommentWithAuthor>> {
    req.validate()?;
    let comment = add_comment(&state.db, &user, CommentTarget::Task(id), req.content).await?;
    Ok(Json(comment))
}

pub async fn create_project_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentContent>,
) -> ApiResult<Json<CommentWithAuthor>> {
    req.validate()?;
    let comment = add_comment(&state.db, &user, CommentTarget::Project(id), req.content).await?;
    Ok(Json(comment))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentContent>,
) -> ApiResult<Json<CommentWithAuthor>> {
    req.validate()?;

    let comment = load_authored(&state.db, id, &user, "update").await?;
    Comment::update_content(&state.db, comment.id, req.content).await?;
    info!(comment_id = %comment.id, "Comment updated");

    Ok(Json(load_with_author(&state.db, comment.id).await?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let comment = load_authored(&state.db, id, &user, "delete").await?;

    Comment::delete(&state.db, comment.id).await?;
    info!(comment_id = %comment.id, "Comment deleted");

    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
