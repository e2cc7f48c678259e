/// Demo data endpoints
///
/// - `GET /seed-status` - Row counts and whether demo data is present
/// - `POST /seed-data` - Load demo users, projects, tasks, and time logs;
///   tables that already hold rows are left alone

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use chrono::Utc;
use pmboard_shared::db::seed::{self, SeedReport, SeedStatus};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub created: SeedReport,
}

pub async fn seed_status(State(state): State<AppState>) -> ApiResult<Json<SeedStatus>> {
    Ok(Json(SeedStatus::load(&state.db).await?))
}

pub async fn seed_data(State(state): State<AppState>) -> ApiResult<Json<SeedResponse>> {
    let report = seed::seed(&state.db, Utc::now()).await?;
    info!(?report, "Seed data loaded");

    Ok(Json(SeedResponse {
        message: "Seed data loaded successfully".to_string(),
        created: report,
    }))
}
