//! Account management module
//!
//! Email + password accounts stored in the `users` table with Argon2 hashes.

pub mod models;
pub mod password;
pub mod service;

pub use models::{User, UserIdentity};
pub use service::{AccountService, LoginRequest, RegisterRequest};
