use axum::extract::State;
use axum::{routing::get, Json, Router};
use pitchdeck_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    pub timestamp: Timestamp,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Content store backend (`postgres` or `memory`).
    pub storage: &'static str,
    /// Whether the content store answers.
    pub store_healthy: bool,
}

/// GET /health -- returns service and content store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = state.store.ping().await.is_ok();

    let status = if store_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        storage: state.store.backend(),
        store_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
