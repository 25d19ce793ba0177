//! Health and metrics endpoints.

use axum::{extract::State, Json};
use telemetry::{health, metrics, MetricsSnapshot};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - peer reachability and live session count.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        report: health().report(),
        active_sessions: state.service.sessions().len(),
    })
}

/// GET /metrics
pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
