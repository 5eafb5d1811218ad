//! Order Database Layer
//!
//! Every mutation is either one compare-and-set statement or one
//! transaction around its read-check-write sequence.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::state::OrderStatus;
use super::types::{AdminOrderView, NewOrder, OrderId, OrderPatch, OrderView, StatusAuditEntry};
use crate::db::{begin_write, ms_to_datetime, now_ms};
use crate::error::{StoreError, StoreResult, is_foreign_key_violation, is_unique_violation};

const SELECT_ORDER_VIEW: &str = r#"
    SELECT o.id, o.user_id, o.telegram_id, o.service_id, o.amount, o.utr, o.status,
           o.created_at, s.name AS service_name
    FROM orders o
    LEFT JOIN services s ON o.service_id = s.id
"#;

/// Back office only: exposes owner emails
const SELECT_ADMIN_ORDER_VIEW: &str = r#"
    SELECT o.id, o.user_id, o.telegram_id, o.service_id, o.amount, o.utr, o.status,
           o.created_at, s.name AS service_name, u.email AS user_email
    FROM orders o
    LEFT JOIN services s ON o.service_id = s.id
    LEFT JOIN users u ON o.user_id = u.id
"#;

const NEWEST_FIRST: &str = "ORDER BY o.created_at DESC, o.rowid DESC";

/// Result of one insert attempt
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted,
    /// Primary key already taken, nothing written
    IdTaken(sqlx::Error),
}

/// Order database operations
pub struct OrderDb {
    pool: SqlitePool,
}

impl OrderDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a `pending` order after re-checking its references and price
    /// inside the same transaction.
    pub async fn insert(&self, order_id: &OrderId, order: &NewOrder) -> StoreResult<InsertOutcome> {
        let mut tx = begin_write(&self.pool).await?;

        let price: Option<i64> = sqlx::query_scalar("SELECT price FROM services WHERE id = $1")
            .bind(order.service_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(price) = price else {
            return Err(StoreError::Reference(format!(
                "Service {} does not exist. Please refresh the page.",
                order.service_id
            )));
        };
        if price != order.amount {
            return Err(StoreError::validation(format!(
                "Amount {} does not match the current price {}",
                order.amount, price
            )));
        }

        if let Some(user_id) = order.user_id {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(StoreError::Reference(
                    "User session invalid. Please log out and log in again.".to_string(),
                ));
            }
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (id, telegram_id, service_id, amount, user_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order_id.as_str())
        .bind(&order.telegram_id)
        .bind(order.service_id)
        .bind(order.amount)
        .bind(order.user_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(now_ms())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(InsertOutcome::Inserted)
            }
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::IdTaken(e)),
            Err(e) if is_foreign_key_violation(&e) => Err(StoreError::Reference(
                "Order references a missing service or user".to_string(),
            )),
            Err(e) => Err(StoreError::Persistence(e)),
        }
    }

    pub async fn get(&self, order_id: &OrderId) -> StoreResult<Option<OrderView>> {
        let sql = format!("{} WHERE o.id = $1", SELECT_ORDER_VIEW);
        let row = sqlx::query(&sql)
            .bind(order_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_view).transpose()
    }

    pub async fn current_status(&self, order_id: &OrderId) -> StoreResult<Option<OrderStatus>> {
        let mut conn = self.pool.acquire().await?;
        status_of(&mut conn, order_id).await
    }

    /// Atomic CAS: record the UTR and move to `to` only if the current status
    /// is one of `sources`. Returns false if no row matched.
    pub async fn set_utr_if(
        &self,
        order_id: &OrderId,
        utr: &str,
        to: OrderStatus,
        sources: &[OrderStatus],
    ) -> StoreResult<bool> {
        if sources.is_empty() {
            return Ok(false);
        }
        let sql = format!(
            "UPDATE orders SET utr = $1, status = $2 WHERE id = $3 AND status IN ({})",
            status_in_list(sources)
        );
        let result = sqlx::query(&sql)
            .bind(utr)
            .bind(to.as_str())
            .bind(order_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the status regardless of the transition table and write an
    /// audit row. Returns the previous status, `None` if the order is absent.
    pub async fn force_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        actor: &str,
        reason: Option<&str>,
    ) -> StoreResult<Option<OrderStatus>> {
        let mut tx = begin_write(&self.pool).await?;

        let Some(previous) = status_of(&mut tx, order_id).await? else {
            return Ok(None);
        };

        sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(order_id.as_str())
            .execute(&mut *tx)
            .await?;
        insert_audit(&mut tx, order_id, previous, status, actor, reason).await?;

        tx.commit().await?;
        Ok(Some(previous))
    }

    /// Merge `patch` into the order. Returns the previous status, `None` if
    /// the order is absent. A status change is audited.
    pub async fn apply_patch(
        &self,
        order_id: &OrderId,
        patch: &OrderPatch,
        actor: &str,
    ) -> StoreResult<Option<OrderStatus>> {
        let mut tx = begin_write(&self.pool).await?;

        let Some(previous) = status_of(&mut tx, order_id).await? else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE orders
            SET telegram_id = COALESCE($1, telegram_id),
                amount      = COALESCE($2, amount),
                utr         = COALESCE($3, utr),
                status      = COALESCE($4, status)
            WHERE id = $5
            "#,
        )
        .bind(patch.telegram_id.as_deref())
        .bind(patch.amount)
        .bind(patch.utr.as_deref())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(order_id.as_str())
        .execute(&mut *tx)
        .await?;

        if let Some(status) = patch.status {
            if status != previous {
                insert_audit(&mut tx, order_id, previous, status, actor, Some("admin patch"))
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(previous))
    }

    pub async fn delete(&self, order_id: &OrderId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<OrderView>> {
        let sql = format!("{} WHERE o.user_id = $1 {}", SELECT_ORDER_VIEW, NEWEST_FIRST);
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_view).collect()
    }

    pub async fn list_all(&self) -> StoreResult<Vec<AdminOrderView>> {
        let sql = format!("{} {}", SELECT_ADMIN_ORDER_VIEW, NEWEST_FIRST);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                Ok(AdminOrderView {
                    order: row_to_view(row)?,
                    user_email: row.get("user_email"),
                })
            })
            .collect()
    }

    /// Audit rows for an order, oldest first
    pub async fn history(&self, order_id: &OrderId) -> StoreResult<Vec<StatusAuditEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, from_status, to_status, actor, reason, created_at
            FROM order_status_audit
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                Ok(StatusAuditEntry {
                    order_id: r.get("order_id"),
                    from_status: parse_status(r.get("from_status"))?,
                    to_status: parse_status(r.get("to_status"))?,
                    actor: r.get("actor"),
                    reason: r.get("reason"),
                    created_at: ms_to_datetime(r.get("created_at")),
                })
            })
            .collect()
    }

    pub async fn count(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?)
    }
}

async fn status_of(
    conn: &mut SqliteConnection,
    order_id: &OrderId,
) -> StoreResult<Option<OrderStatus>> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
        .bind(order_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    status.map(parse_status).transpose()
}

async fn insert_audit(
    conn: &mut SqliteConnection,
    order_id: &OrderId,
    from: OrderStatus,
    to: OrderStatus,
    actor: &str,
    reason: Option<&str>,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_status_audit (order_id, from_status, to_status, actor, reason, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(order_id.as_str())
    .bind(from.as_str())
    .bind(to.as_str())
    .bind(actor)
    .bind(reason)
    .bind(now_ms())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

fn parse_status(raw: String) -> StoreResult<OrderStatus> {
    raw.parse()
        .map_err(|e| StoreError::Internal(format!("Corrupt order status in store: {}", e)))
}

/// `'pending', 'processing'` - built from enum constants only
fn status_in_list(statuses: &[OrderStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn row_to_view(row: &SqliteRow) -> StoreResult<OrderView> {
    Ok(OrderView {
        id: row.get("id"),
        user_id: row.get("user_id"),
        telegram_id: row.get("telegram_id"),
        service_id: row.get("service_id"),
        amount: row.get("amount"),
        utr: row.get("utr"),
        status: parse_status(row.get("status"))?,
        created_at: ms_to_datetime(row.get("created_at")),
        service_name: row.get("service_name"),
    })
}
