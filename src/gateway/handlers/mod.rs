//! HTTP handlers, one file per route group

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod chat;
pub mod health;
pub mod order;

pub use admin::{
    admin_login, create_service, delete_order, delete_service, list_orders, order_history,
    patch_order, set_order_status, update_order, update_service,
};
pub use auth::{login, register};
pub use catalog::list_services;
pub use chat::chat;
pub use health::health_check;
pub use order::{confirm_order, create_order, get_order, list_user_orders};

use crate::error::StoreError;

/// Parse a numeric path segment, reporting bad input as a validation error
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, StoreError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| StoreError::validation(format!("Invalid {}", what)))
}
