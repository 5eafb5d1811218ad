//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::gateway::state::AppState;
use crate::gateway::types::HealthResponse;

/// Health check endpoint
///
/// Pings the store. Reports 500 with `database: "disconnected"` when the
/// ping fails; the failure detail only goes to the log.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 500, description = "Store unreachable", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: "connected".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        ),
        Err(e) => {
            tracing::error!("[HEALTH] Store ping failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error".to_string(),
                    database: "disconnected".to_string(),
                    version: None,
                }),
            )
        }
    }
}
