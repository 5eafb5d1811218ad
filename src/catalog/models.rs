//! Catalog item types

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{StoreError, StoreResult};

/// A sellable subscription pack ("service")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct CatalogItem {
    #[schema(example = 2)]
    pub id: i64,
    #[schema(example = "7 Day Pack")]
    pub name: String,
    /// Whole currency units
    #[schema(example = 400)]
    pub price: i64,
    #[schema(example = "7 Days")]
    pub duration: String,
}

/// Validated fields for create/update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItemDraft {
    pub name: String,
    pub price: i64,
    pub duration: String,
}

impl CatalogItemDraft {
    /// Trim and check the fields. Name and duration must be non-blank,
    /// price strictly positive.
    pub fn new(name: &str, price: i64, duration: &str) -> StoreResult<Self> {
        let name = name.trim();
        let duration = duration.trim();

        if name.is_empty() {
            return Err(StoreError::validation("Service name is required"));
        }
        if duration.is_empty() {
            return Err(StoreError::validation("Service duration is required"));
        }
        if price <= 0 {
            return Err(StoreError::validation("Price must be a positive number"));
        }

        Ok(Self {
            name: name.to_string(),
            price,
            duration: duration.to_string(),
        })
    }
}

/// Packs inserted into an empty catalog on first start
pub const DEFAULT_PACKS: [(&str, i64, &str); 5] = [
    ("1 Day Pack", 100, "1 Day"),
    ("7 Day Pack", 400, "7 Days"),
    ("15 Day Pack", 500, "15 Days"),
    ("30 Day Pack", 800, "30 Days"),
    ("Full Season", 1500, "Full Season"),
];
