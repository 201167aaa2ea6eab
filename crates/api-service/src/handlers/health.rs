//! Health handlers.
//!
//! - `/api`: static liveness string
//! - `/api/health`: reports database reachability without failing the request

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

/// Body returned by `GET /api`.
pub const API_RUNNING_MESSAGE: &str = "API is running";

/// Handler for GET /api
pub async fn api_root() -> &'static str {
    API_RUNNING_MESSAGE
}

/// Handler for GET /api/health
///
/// Runs `SELECT 1` against the pool. The endpoint always answers 200; the
/// body says whether the database responded. The database error itself is
/// logged, never returned.
#[tracing::instrument(skip_all, name = "api.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!(target: "api.health", error = %e, "Health check: database unreachable");
            "unhealthy"
        }
    };

    Json(HealthResponse {
        status: database.to_string(),
        database: database.to_string(),
    })
}
