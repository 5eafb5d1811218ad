//! Order Core Types

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use super::state::OrderStatus;
use crate::error::{StoreError, StoreResult};

/// Human-readable order token: `MARS-` followed by 9 upper-case alphanumerics.
///
/// 36^9 (~1e14) combinations; uniqueness is still enforced by the store's
/// primary key and collisions are retried by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    pub const PREFIX: &'static str = "MARS-";
    const CODE_LEN: usize = 9;
    const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Generate a fresh random token
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code: String = (0..Self::CODE_LEN)
            .map(|_| Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())] as char)
            .collect();
        Self(format!("{}{}", Self::PREFIX, code))
    }

    /// Wrap a stored or client-supplied token without reformatting it
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated CreateOrder input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub telegram_id: String,
    pub service_id: i64,
    pub amount: i64,
    pub user_id: Option<i64>,
}

impl NewOrder {
    pub fn new(
        telegram_id: &str,
        service_id: i64,
        amount: i64,
        user_id: Option<i64>,
    ) -> StoreResult<Self> {
        let telegram_id = telegram_id.trim();
        if telegram_id.is_empty() {
            return Err(StoreError::validation("Telegram ID is required"));
        }
        if amount <= 0 {
            return Err(StoreError::validation("Amount must be a positive number"));
        }

        Ok(Self {
            telegram_id: telegram_id.to_string(),
            service_id,
            amount,
            user_id,
        })
    }
}

/// Admin partial update: `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub telegram_id: Option<String>,
    pub amount: Option<i64>,
    pub utr: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    pub fn new(
        telegram_id: Option<&str>,
        amount: Option<i64>,
        utr: Option<&str>,
        status: Option<&str>,
    ) -> StoreResult<Self> {
        let telegram_id = match telegram_id.map(str::trim) {
            Some("") => return Err(StoreError::validation("Telegram ID cannot be empty")),
            other => other.map(str::to_string),
        };
        if matches!(amount, Some(a) if a <= 0) {
            return Err(StoreError::validation("Amount must be a positive number"));
        }
        let utr = match utr.map(str::trim) {
            Some("") => return Err(StoreError::validation("UTR cannot be empty")),
            other => other.map(str::to_string),
        };
        let status = status
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(|e| StoreError::validation(e.to_string()))?;

        let patch = Self {
            telegram_id,
            amount,
            utr,
            status,
        };
        if patch.is_empty() {
            return Err(StoreError::validation("Nothing to update"));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.telegram_id.is_none()
            && self.amount.is_none()
            && self.utr.is_none()
            && self.status.is_none()
    }
}

/// Order row joined with its catalog item name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderView {
    #[schema(example = "MARS-7K2Q9ZP4X")]
    pub id: String,
    /// Absent for guest orders
    pub user_id: Option<i64>,
    #[schema(example = "@player")]
    pub telegram_id: String,
    pub service_id: i64,
    /// Price snapshot taken at creation
    #[schema(example = 400)]
    pub amount: i64,
    pub utr: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Null when the catalog row no longer exists
    pub service_name: Option<String>,
}

/// Back-office order row: [`OrderView`] plus the owner's email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: OrderView,
    /// Null for guest orders
    pub user_email: Option<String>,
}

/// One admin-forced status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusAuditEntry {
    pub order_id: String,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub actor: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
