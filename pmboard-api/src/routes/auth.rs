/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Create an account (JSON body)
/// - `POST /auth/login` - Exchange credentials for a bearer token
///   (form-encoded `username` + `password`; the username field also accepts
///   an email address)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Form, Json};
use pmboard_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// OAuth2-style password form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username or email
    pub username: String,
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,
}

/// Register a new user
///
/// # Errors
///
/// - `409 Conflict`: Email or username already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.trim().to_string(),
            username: req.username.trim().to_string(),
            full_name: req.full_name.filter(|name| !name.trim().is_empty()),
            password_hash,
        },
    )
    .await?;

    info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Json(user))
}

/// Log in with username (or email) and password
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown user or wrong password
/// - `400 Bad Request`: Account is deactivated
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let invalid = || ApiError::Unauthorized("Incorrect username or password".to_string());

    let user = User::find_by_login(&state.db, form.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&form.password, &user.password_hash)? {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let claims = jwt::Claims::new(
        user.id,
        chrono::Duration::minutes(state.config.jwt.expire_minutes),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
