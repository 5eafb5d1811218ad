//! Data models for storefront accounts

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Stored account. The password hash never leaves this crate's services.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public identity returned on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserIdentity {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "player@example.com")]
    pub email: String,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
