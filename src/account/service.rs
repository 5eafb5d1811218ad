use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use utoipa::ToSchema;
use validator::Validate;

use super::models::{User, UserIdentity, normalize_email};
use super::password::{hash_password, verify_against_dummy, verify_password};
use crate::db::{ms_to_datetime, now_ms};
use crate::error::{StoreError, StoreResult, is_unique_violation};

/// User Registration Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required"))]
    #[schema(example = "player@example.com")]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email and password are required"))]
    #[schema(example = "player@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Email and password are required"))]
    #[schema(example = "password123")]
    pub password: String,
}

pub struct AccountService {
    db: SqlitePool,
}

impl AccountService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Register a new user. Duplicate emails are caught by the store's
    /// unique constraint, so concurrent registrations cannot both succeed.
    pub async fn register(&self, req: RegisterRequest) -> StoreResult<i64> {
        let email = normalize_email(&req.email);
        let password_hash = hash_password(&req.password)?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password_hash, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(now_ms())
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail
            } else {
                StoreError::Persistence(e)
            }
        })?;

        tracing::info!(user_id, "User registered");
        Ok(user_id)
    }

    /// Check credentials. Unknown email and wrong password fail identically.
    pub async fn login(&self, req: LoginRequest) -> StoreResult<UserIdentity> {
        let email = normalize_email(&req.email);

        let Some(user) = self.find_by_email(&email).await? else {
            verify_against_dummy(&req.password);
            return Err(StoreError::InvalidCredentials);
        };

        if !verify_password(&req.password, &user.password_hash) {
            return Err(StoreError::InvalidCredentials);
        }

        Ok(UserIdentity::from(&user))
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            email: r.get("email"),
            password_hash: r.get("password_hash"),
            created_at: ms_to_datetime(r.get("created_at")),
        }))
    }

    pub async fn count_users(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?)
    }
}
