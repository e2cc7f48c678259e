/// Service info and health check
///
/// # Endpoints
///
/// - `GET /` - API name, version, and docs location
/// - `GET /health` - Liveness plus database connectivity
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": { "active_connections": 0, "idle_connections": 1, "total_connections": 1 }
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use pmboard_shared::db::pool::{self, PoolStats};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Root response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,

    pub pool: PoolStats,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Project Management Dashboard API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/docs".to_string(),
    })
}

/// Always answers 200; a database outage reports `degraded`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match pool::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        pool: pool::pool_stats(&state.db),
    })
}
