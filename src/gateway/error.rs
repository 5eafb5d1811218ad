//! HTTP rendering of [`StoreError`]

use axum::{
    Json,
    response::{IntoResponse, Response},
};

use super::types::ErrorBody;
use crate::error::StoreError;

/// Handler error: renders `{"error", "code"}` with the variant's status
#[derive(Debug)]
pub struct ApiError(pub StoreError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError(StoreError::Persistence(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.http_status();
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), "Request failed: {}", self.0);
        } else {
            tracing::debug!(code = self.0.code(), "Request rejected: {}", self.0);
        }

        let body = ErrorBody {
            error: self.0.public_message(),
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
