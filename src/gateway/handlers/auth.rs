//! Customer account handlers

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::account::{LoginRequest, RegisterRequest};
use crate::gateway::error::ApiResult;
use crate::gateway::state::AppState;
use crate::gateway::types::{ErrorBody, LoginResponse, RegisterResponse, ValidatedJson};

/// Register a customer account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input or email already registered", body = ErrorBody)
    ),
    tag = "Account"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    let user_id = state.accounts.register(req).await?;
    Ok(Json(RegisterResponse {
        success: true,
        user_id,
    }))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tag = "Account"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state.accounts.login(req).await?;
    Ok(Json(LoginResponse {
        success: true,
        user,
    }))
}
