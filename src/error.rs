//! Storefront Error Types
//!
//! One taxonomy shared by the catalog, account, order and admin services.
//! Each variant carries a stable machine code and an HTTP status so the
//! gateway can render it without inspecting messages.

use axum::http::StatusCode;
use thiserror::Error;

use crate::order::OrderStatus;

#[derive(Error, Debug)]
pub enum StoreError {
    // === Client-correctable ===
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Reference(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Conflict(String),

    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    // === Authentication ===
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    // === Collaborators ===
    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    // === Server faults ===
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        StoreError::NotFound(msg.into())
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "VALIDATION_ERROR",
            StoreError::Reference(_) => "REFERENCE_ERROR",
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::DuplicateEmail => "DUPLICATE_EMAIL",
            StoreError::Conflict(_) => "CONFLICT",
            StoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
            StoreError::InvalidCredentials => "INVALID_CREDENTIALS",
            StoreError::Unauthorized(_) => "UNAUTHORIZED",
            StoreError::Upstream(_) => "UPSTREAM_ERROR",
            StoreError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            StoreError::Persistence(_) => "PERSISTENCE_ERROR",
            StoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            StoreError::Validation(_)
            | StoreError::Reference(_)
            | StoreError::DuplicateEmail => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) | StoreError::InvalidTransition { .. } => StatusCode::CONFLICT,
            StoreError::InvalidCredentials | StoreError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            StoreError::Upstream(_) => StatusCode::BAD_GATEWAY,
            StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Persistence(_) | StoreError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to clients. Server faults never leak store detail.
    pub fn public_message(&self) -> String {
        match self {
            StoreError::Persistence(_) => "Storage error, please try again later".to_string(),
            StoreError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// True when the store rejected a write on a UNIQUE / PRIMARY KEY constraint
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// True when the store rejected a write on a FOREIGN KEY constraint
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
