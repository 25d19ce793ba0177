//! Accounting lifecycle endpoints.

use aaa_core::{
    AaaContext, AcctResponse, AddSessionsRequest, CreateSessionResponse, StartRequest,
    StopRequest, TerminateSessionRequest, UpdateRequest,
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::warn;

use crate::response::ApiError;
use crate::state::AppState;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// POST /accounting/start
pub async fn start_handler(
    State(state): State<AppState>,
    body: JsonBody<StartRequest>,
) -> Result<Json<AcctResponse>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.service.start(&req).await?))
}

/// POST /accounting/interim-update
pub async fn interim_update_handler(
    State(state): State<AppState>,
    body: JsonBody<UpdateRequest>,
) -> Result<Json<AcctResponse>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.service.interim_update(&req).await?))
}

/// POST /accounting/stop
pub async fn stop_handler(
    State(state): State<AppState>,
    body: JsonBody<StopRequest>,
) -> Result<Json<AcctResponse>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.service.stop(&req).await?))
}

/// POST /accounting/create-session
pub async fn create_session_handler(
    State(state): State<AppState>,
    body: JsonBody<AaaContext>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let Json(ctx) = body?;
    Ok(Json(state.service.create_session(&ctx).await?))
}

/// POST /accounting/terminate-session
pub async fn terminate_session_handler(
    State(state): State<AppState>,
    body: JsonBody<TerminateSessionRequest>,
) -> Result<Json<AcctResponse>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.service.terminate_session(&req).await?))
}

/// POST /accounting/sessions - bulk recovery.
pub async fn add_sessions_handler(
    State(state): State<AppState>,
    body: JsonBody<AddSessionsRequest>,
) -> Result<Json<AcctResponse>, ApiError> {
    let Json(req) = body?;
    let response = state.service.add_sessions(&req).inspect_err(|e| {
        warn!(requested = req.sessions.len(), "Bulk session recovery incomplete: {}", e)
    })?;
    Ok(Json(response))
}

/// POST /accounting/authenticated
pub async fn authenticated_handler(
    State(state): State<AppState>,
    body: JsonBody<AaaContext>,
) -> Result<Json<AcctResponse>, ApiError> {
    let Json(ctx) = body?;
    state.service.add_authenticated_session(ctx)?;
    Ok(Json(AcctResponse::default()))
}
