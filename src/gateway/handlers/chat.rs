use std::sync::Arc;

use axum::{Json, extract::State};

use crate::chat;
use crate::error::StoreError;
use crate::gateway::error::ApiResult;
use crate::gateway::state::AppState;
use crate::gateway::types::{ChatRequest, ChatResponse, ErrorBody, ValidatedJson};

/// Relay a message to the support assistant
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorBody),
        (status = 502, description = "Model call failed", body = ErrorBody),
        (status = 503, description = "Chat not configured", body = ErrorBody)
    ),
    tag = "Chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let relay = state
        .chat
        .as_ref()
        .ok_or_else(|| StoreError::Unavailable("Chat assistant is not configured".to_string()))?;

    let (message, history) = chat::prepare(&req.message, req.history)?;
    let reply = relay.reply(&message, &history).await?;
    Ok(Json(ChatResponse { reply }))
}
