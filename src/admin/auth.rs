//! Admin session tokens
//!
//! A single configured operator logs in with an id and password and gets
//! an HS256 JWT carrying `role = "admin"`. Every privileged call verifies
//! signature, expiry and role.

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::password::{hash_password, verify_password};
use crate::config::AdminConfig;
use crate::error::{StoreError, StoreResult};

pub const ADMIN_ROLE: &str = "admin";

/// Admin JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Freshly issued session
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AdminAuth {
    admin_id: String,
    password_hash: String,
    jwt_secret: String,
    session_ttl: Duration,
}

impl AdminAuth {
    /// Build from config. A plaintext password is hashed here and dropped.
    pub fn from_config(config: &AdminConfig) -> StoreResult<Self> {
        let password_hash = match (&config.password_hash, &config.password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(password)) => hash_password(password)?,
            (None, None) => {
                return Err(StoreError::Internal(
                    "admin.password or admin.password_hash must be configured".to_string(),
                ));
            }
        };
        if config.jwt_secret.is_empty() {
            return Err(StoreError::Internal(
                "admin.jwt_secret must not be empty".to_string(),
            ));
        }
        if config.session_ttl_secs <= 0 {
            return Err(StoreError::Internal(
                "admin.session_ttl_secs must be positive".to_string(),
            ));
        }

        Ok(Self {
            admin_id: config.admin_id.clone(),
            password_hash,
            jwt_secret: config.jwt_secret.clone(),
            session_ttl: Duration::seconds(config.session_ttl_secs),
        })
    }

    /// Check operator credentials and issue a session token
    pub fn login(&self, admin_id: &str, password: &str) -> StoreResult<AdminSession> {
        // Always run the hash check so a wrong id costs the same as a wrong password
        let password_ok = verify_password(password, &self.password_hash);
        if admin_id != self.admin_id || !password_ok {
            tracing::warn!(admin_id, "Admin login failed");
            return Err(StoreError::InvalidCredentials);
        }

        let session = self.issue(Utc::now())?;
        tracing::info!(admin_id, expires_at = %session.expires_at, "Admin session issued");
        Ok(session)
    }

    fn issue(&self, now: DateTime<Utc>) -> StoreResult<AdminSession> {
        let expires_at = now + self.session_ttl;
        let claims = AdminClaims {
            sub: self.admin_id.clone(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| StoreError::Internal(format!("Failed to sign admin token: {}", e)))?;

        Ok(AdminSession { token, expires_at })
    }

    /// Verify signature, expiry and role
    pub fn verify(&self, token: &str) -> StoreResult<AdminClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("Admin token rejected: {}", e);
            StoreError::Unauthorized("Invalid or expired token".to_string())
        })?;

        if data.claims.role != ADMIN_ROLE {
            return Err(StoreError::Unauthorized(
                "Admin role required".to_string(),
            ));
        }
        Ok(data.claims)
    }

    /// Verify the `Authorization: Bearer` header
    pub fn authorize(&self, headers: &HeaderMap) -> StoreResult<AdminClaims> {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| StoreError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StoreError::Unauthorized("Invalid token format".to_string()))?;

        self.verify(token)
    }
}
