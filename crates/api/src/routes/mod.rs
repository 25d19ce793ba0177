//! API routes.

pub mod accounting;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/accounting/start", post(accounting::start_handler))
        .route("/accounting/interim-update", post(accounting::interim_update_handler))
        .route("/accounting/stop", post(accounting::stop_handler))
        .route("/accounting/create-session", post(accounting::create_session_handler))
        .route("/accounting/terminate-session", post(accounting::terminate_session_handler))
        .route("/accounting/sessions", post(accounting::add_sessions_handler))
        .route("/accounting/authenticated", post(accounting::authenticated_handler))
        .route("/health", get(health::health_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
