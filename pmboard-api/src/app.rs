/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use pmboard_api::{app::{build_router, AppState}, config::Config};
/// use pmboard_shared::notify::{LogMailer, Notifier};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let notifier = Notifier::new(Arc::new(LogMailer), config.mail.frontend_url.clone());
///
/// let app = build_router(AppState::new(pool, config, notifier));
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use pmboard_shared::{
    auth::middleware::{authenticate, CurrentUser},
    notify::Notifier,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,

    /// Task email notifications
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, notifier: Notifier) -> Self {
        Self {
            db,
            config: Arc::new(config),
            notifier,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /                               public info
/// /health, /seed-status           public
/// POST /seed-data                 public
/// /auth/{register,login}          public
/// /users, /projects, /tasks,
/// /timelog, /comments,
/// /performance-metrics            bearer token required
/// ```
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/seed-status", get(routes::seed::seed_status))
        .route("/seed-data", post(routes::seed::seed_data))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/me",
            get(routes::users::get_me).put(routes::users::update_me),
        );

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/:id/tasks", get(routes::projects::list_project_tasks))
        .route("/:id/summary", get(routes::projects::project_summary))
        .route(
            "/:id/comments",
            get(routes::comments::list_project_comments)
                .post(routes::comments::create_project_comment),
        );

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/my-tasks", get(routes::tasks::my_tasks))
        .route("/my-tasks/stats", get(routes::tasks::my_task_stats))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/:id/time-logs",
            get(routes::timelog::list_task_time_logs).post(routes::timelog::create_task_time_log),
        )
        .route(
            "/:id/comments",
            get(routes::comments::list_task_comments).post(routes::comments::create_task_comment),
        );

    let timelog_routes = Router::new()
        .route(
            "/",
            get(routes::timelog::list_time_logs).post(routes::timelog::create_time_log),
        )
        .route(
            "/summary/user/:user_id",
            get(routes::timelog::user_time_summary),
        )
        .route(
            "/:id",
            get(routes::timelog::get_time_log)
                .put(routes::timelog::update_time_log)
                .delete(routes::timelog::delete_time_log),
        );

    let comment_routes = Router::new()
        .route("/", post(routes::comments::create_comment))
        .route("/task/:id", get(routes::comments::list_task_comments))
        .route("/project/:id", get(routes::comments::list_project_comments))
        .route(
            "/:id",
            put(routes::comments::update_comment).delete(routes::comments::delete_comment),
        );

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/timelog", timelog_routes)
        .nest("/comments", comment_routes)
        .route(
            "/performance-metrics",
            get(routes::metrics::performance_metrics),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Resolves the bearer token and stores the caller as [`CurrentUser`]
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.db, state.jwt_secret(), req.headers()).await?;
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
