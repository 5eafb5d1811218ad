use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;

use crate::gateway::{error::ApiError, state::AppState};

/// Gate for `/api/admin/*`: verifies the bearer token and injects
/// [`AdminClaims`](super::AdminClaims) into request extensions.
pub async fn admin_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = state.admin.authorize(request.headers()).map_err(|e| {
        tracing::warn!(path = %request.uri().path(), "Admin request rejected: {}", e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
