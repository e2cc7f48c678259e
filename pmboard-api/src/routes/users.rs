/// User endpoints
///
/// - `GET /users/me` - The authenticated user
/// - `PUT /users/me` - Update own profile (password is re-hashed)
/// - `GET /users` - Active users, for assignment pickers

use super::Pagination;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use pmboard_shared::{
    auth::{middleware::CurrentUser, password},
    models::{
        patch::double_option,
        user::{UpdateUser, User},
    },
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Profile update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMe {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,

    /// `null` clears the name
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Option<Option<String>>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

pub async fn get_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateMe>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let password_hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let update = UpdateUser {
        email: req.email,
        username: req.username,
        full_name: req.full_name,
        password_hash,
    };

    let updated = User::update(&state.db, user.id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    info!(user_id = %updated.id, "Profile updated");

    Ok(Json(updated))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<User>>> {
    let users = User::list_active(&state.db, page.limit(), page.offset()).await?;
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_me_distinguishes_null_name() {
        let req: UpdateMe = serde_json::from_str(r#"{"full_name": null}"#).unwrap();
        assert_eq!(req.full_name, Some(None));

        let req: UpdateMe = serde_json::from_str(r#"{"username": "bob"}"#).unwrap();
        assert_eq!(req.full_name, None);
        assert_eq!(req.username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_update_me_validation() {
        let req = UpdateMe {
            password: Some("short".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(UpdateMe::default().validate().is_ok());
    }
}
