/// Comment model and database operations
///
/// Every comment targets exactly one task or one project. The rule is checked
/// when the payload is turned into a [`CommentTarget`] and again by a database
/// CHECK constraint. Editing and deleting is limited to the author.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     content TEXT NOT NULL,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     task_id UUID REFERENCES tasks(id) ON DELETE CASCADE,
///     project_id UUID REFERENCES projects(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ,
///     CHECK ((task_id IS NULL) <> (project_id IS NULL))
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Comment record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Public author fields shown alongside a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
}

/// Comment with its author, as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: CommentAuthor,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    #[sqlx(flatten)]
    comment: Comment,
    author_username: String,
    author_full_name: Option<String>,
}

impl From<CommentRow> for CommentWithAuthor {
    fn from(row: CommentRow) -> Self {
        Self {
            author: CommentAuthor {
                id: row.comment.author_id,
                username: row.author_username,
                full_name: row.author_full_name,
            },
            comment: row.comment,
        }
    }
}

/// What a comment is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Task(Uuid),
    Project(Uuid),
}

/// Rejected comment target combinations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentTargetError {
    #[error("Either task_id or project_id must be provided")]
    Missing,

    #[error("Cannot comment on both task and project simultaneously")]
    Ambiguous,
}

impl CommentTarget {
    /// Builds a target from the optional ids of a payload
    pub fn from_ids(
        task_id: Option<Uuid>,
        project_id: Option<Uuid>,
    ) -> Result<Self, CommentTargetError> {
        match (task_id, project_id) {
            (Some(task_id), None) => Ok(CommentTarget::Task(task_id)),
            (None, Some(project_id)) => Ok(CommentTarget::Project(project_id)),
            (Some(_), Some(_)) => Err(CommentTargetError::Ambiguous),
            (None, None) => Err(CommentTargetError::Missing),
        }
    }

    fn task_id(&self) -> Option<Uuid> {
        match self {
            CommentTarget::Task(id) => Some(*id),
            CommentTarget::Project(_) => None,
        }
    }

    fn project_id(&self) -> Option<Uuid> {
        match self {
            CommentTarget::Project(id) => Some(*id),
            CommentTarget::Task(_) => None,
        }
    }
}

/// Payload for `POST /comments`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(length(min = 1, message = "Comment cannot be empty"))]
    pub content: String,

    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl CreateComment {
    pub fn target(&self) -> Result<CommentTarget, CommentTargetError> {
        CommentTarget::from_ids(self.task_id, self.project_id)
    }
}

/// Payload for comment edits and for the nested
/// `/tasks/{id}/comments` and `/projects/{id}/comments` routes
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentContent {
    #[validate(length(min = 1, message = "Comment cannot be empty"))]
    pub content: String,
}

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT c.*, u.username AS author_username, u.full_name AS author_full_name
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

impl Comment {
    pub async fn create(
        pool: &PgPool,
        author_id: Uuid,
        target: CommentTarget,
        content: String,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (content, author_id, task_id, project_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(content)
        .bind(author_id)
        .bind(target.task_id())
        .bind(target.project_id())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_author(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<CommentWithAuthor>, sqlx::Error> {
        let query = format!("{} WHERE c.id = $1", SELECT_WITH_AUTHOR);
        let row = sqlx::query_as::<_, CommentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Comments on `target`, newest first
    pub async fn list_for(
        pool: &PgPool,
        target: CommentTarget,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        let query = match target {
            CommentTarget::Task(_) => format!(
                "{} WHERE c.task_id = $1 ORDER BY c.created_at DESC",
                SELECT_WITH_AUTHOR
            ),
            CommentTarget::Project(_) => format!(
                "{} WHERE c.project_id = $1 ORDER BY c.created_at DESC",
                SELECT_WITH_AUTHOR
            ),
        };
        let id = target.task_id().or(target.project_id());

        let rows = sqlx::query_as::<_, CommentRow>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        content: String,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of comments attached to `target`
    pub async fn count_for(pool: &PgPool, target: CommentTarget) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM comments WHERE task_id = $1 OR project_id = $2",
        )
        .bind(target.task_id())
        .bind(target.project_id())
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_target() {
        let task = Uuid::new_v4();
        let project = Uuid::new_v4();

        assert_eq!(
            CommentTarget::from_ids(Some(task), None),
            Ok(CommentTarget::Task(task))
        );
        assert_eq!(
            CommentTarget::from_ids(None, Some(project)),
            Ok(CommentTarget::Project(project))
        );
        assert_eq!(
            CommentTarget::from_ids(Some(task), Some(project)),
            Err(CommentTargetError::Ambiguous)
        );
        assert_eq!(
            CommentTarget::from_ids(None, None),
            Err(CommentTargetError::Missing)
        );
    }

    #[test]
    fn test_create_payload_target() {
        let payload: CreateComment = serde_json::from_str(&format!(
            r#"{{"content": "Looks good", "project_id": "{}"}}"#,
            Uuid::nil()
        ))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.target(), Ok(CommentTarget::Project(Uuid::nil())));
    }

    #[test]
    fn test_empty_content_rejected() {
        let payload: CommentContent = serde_json::from_str(r#"{"content": ""}"#).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_author_nested_in_json() {
        let author_id = Uuid::new_v4();
        let row = CommentRow {
            comment: Comment {
                id: Uuid::new_v4(),
                content: "Ship it".to_string(),
                author_id,
                task_id: Some(Uuid::new_v4()),
                project_id: None,
                created_at: Utc::now(),
                updated_at: None,
            },
            author_username: "developer1".to_string(),
            author_full_name: Some("John Developer".to_string()),
        };

        let json = serde_json::to_value(CommentWithAuthor::from(row)).unwrap();
        assert_eq!(json["content"], "Ship it");
        assert_eq!(json["author"]["id"], author_id.to_string());
        assert_eq!(json["author"]["username"], "developer1");
    }
}
