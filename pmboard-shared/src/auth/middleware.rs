/// Bearer-token authentication
///
/// [`authenticate`] resolves an `Authorization: Bearer <jwt>` header to an
/// active [`User`]. The API wraps it in an axum middleware that stores the
/// result as a [`CurrentUser`] request extension.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use pmboard_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(CurrentUser(user)): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use tracing::debug;

use super::jwt::{validate_token, JwtError};
use crate::models::user::User;

/// The authenticated caller, inserted into request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Not authenticated")]
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Signature, expiry, or issuer check failed
    #[error("{0}")]
    InvalidToken(String),

    /// Token subject no longer exists
    #[error("Could not validate credentials")]
    UserNotFound,

    /// Account is deactivated
    #[error("Inactive user")]
    Inactive,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidFormat(_)
            | AuthError::InvalidToken(_)
            | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthError::Inactive => StatusCode::BAD_REQUEST,
            AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid token issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AuthError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let mut response = (
            status,
            Json(json!({ "error": "unauthorized", "message": message })),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Malformed Authorization header".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    Ok(token.trim())
}

/// Resolves the request's bearer token to an active user
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<User, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_token(token, secret)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !user.is_active {
        debug!(user_id = %user.id, "Rejected inactive user");
        return Err(AuthError::Inactive);
    }

    Ok(user)
}
