//! Catalog persistence and rules

use sqlx::SqlitePool;

use super::models::{CatalogItem, CatalogItemDraft, DEFAULT_PACKS};
use crate::db::begin_write;
use crate::error::{StoreError, StoreResult, is_foreign_key_violation};

pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All items in insertion order
    pub async fn list_items(&self) -> StoreResult<Vec<CatalogItem>> {
        let items = sqlx::query_as::<_, CatalogItem>(
            "SELECT id, name, price, duration FROM services ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get_item(&self, id: i64) -> StoreResult<Option<CatalogItem>> {
        let item = sqlx::query_as::<_, CatalogItem>(
            "SELECT id, name, price, duration FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn create_item(&self, draft: CatalogItemDraft) -> StoreResult<CatalogItem> {
        let item = sqlx::query_as::<_, CatalogItem>(
            r#"
            INSERT INTO services (name, price, duration)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, duration
            "#,
        )
        .bind(&draft.name)
        .bind(draft.price)
        .bind(&draft.duration)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(service_id = item.id, name = %item.name, price = item.price, "Catalog item created");
        Ok(item)
    }

    /// Replace name, price and duration. Existing orders keep their amount.
    pub async fn update_item(&self, id: i64, draft: CatalogItemDraft) -> StoreResult<CatalogItem> {
        let item = sqlx::query_as::<_, CatalogItem>(
            r#"
            UPDATE services SET name = $1, price = $2, duration = $3
            WHERE id = $4
            RETURNING id, name, price, duration
            "#,
        )
        .bind(&draft.name)
        .bind(draft.price)
        .bind(&draft.duration)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found(format!("Service {} not found", id)))?;

        tracing::info!(service_id = id, price = item.price, "Catalog item updated");
        Ok(item)
    }

    /// Delete an item. The store's foreign key blocks deletion while any
    /// order references it.
    pub async fn delete_item(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::Conflict(format!(
                        "Service {} is referenced by existing orders",
                        id
                    ))
                } else {
                    StoreError::Persistence(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("Service {} not found", id)));
        }

        tracing::info!(service_id = id, "Catalog item deleted");
        Ok(())
    }

    /// Insert the default packs if the catalog is empty. Returns the number
    /// of rows inserted.
    pub async fn seed_defaults(&self) -> StoreResult<usize> {
        let mut tx = begin_write(&self.pool).await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(0);
        }

        for (name, price, duration) in DEFAULT_PACKS {
            sqlx::query("INSERT INTO services (name, price, duration) VALUES ($1, $2, $3)")
                .bind(name)
                .bind(price)
                .bind(duration)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(count = DEFAULT_PACKS.len(), "Seeded default catalog");
        Ok(DEFAULT_PACKS.len())
    }
}
