//! Mars Storefront - subscription-pack shop backend
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`error`] - Shared error taxonomy
//! - [`db`] - SQLite pool and embedded migrations
//! - [`catalog`] - Subscription packs for sale
//! - [`account`] - Customer accounts (Argon2 passwords)
//! - [`order`] - Order lifecycle, payment confirmation and audit trail
//! - [`admin`] - Operator login and session verification
//! - [`chat`] - Support assistant relay
//! - [`gateway`] - HTTP API (axum) and OpenAPI docs

pub mod config;
pub mod error;
pub mod logging;

pub mod db;

pub mod account;
pub mod admin;
pub mod catalog;
pub mod chat;
pub mod order;

pub mod gateway;

pub use config::AppConfig;
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use gateway::{build_router, run_server, state::AppState};
