//! Admin gateway
//!
//! Operator login and the session check guarding privileged routes.

pub mod auth;
pub mod middleware;

pub use auth::{ADMIN_ROLE, AdminAuth, AdminClaims, AdminSession};
pub use middleware::admin_auth_middleware;
