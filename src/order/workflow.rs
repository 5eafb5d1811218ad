//! Order workflow
//!
//! Create, pay, inspect and administer orders. Persistence lives in
//! [`OrderDb`]; this layer owns validation, id retry and logging.

use sqlx::SqlitePool;
use std::sync::Arc;

use super::db::{InsertOutcome, OrderDb};
use super::state::OrderStatus;
use super::types::{AdminOrderView, NewOrder, OrderId, OrderPatch, OrderView, StatusAuditEntry};
use crate::error::{StoreError, StoreResult};

/// Upper bound on fresh ids tried for one CreateOrder call
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Source of new order ids
pub type IdGenerator = Arc<dyn Fn() -> OrderId + Send + Sync>;

pub struct OrderWorkflow {
    db: OrderDb,
    next_id: IdGenerator,
}

impl OrderWorkflow {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            db: OrderDb::new(pool),
            next_id: Arc::new(OrderId::generate),
        }
    }

    /// Replace the id source (tests force collisions with it)
    pub fn with_id_generator(mut self, next_id: IdGenerator) -> Self {
        self.next_id = next_id;
        self
    }

    /// Create a `pending` order and return its token.
    ///
    /// The referenced item must exist and `amount` must equal its current
    /// price. A taken id is retried with a fresh one.
    pub async fn create_order(&self, order: NewOrder) -> StoreResult<OrderId> {
        let mut last_collision = None;
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let order_id = (self.next_id)();
            match self.db.insert(&order_id, &order).await? {
                InsertOutcome::Inserted => {
                    tracing::info!(
                        order_id = %order_id,
                        service_id = order.service_id,
                        amount = order.amount,
                        user_id = ?order.user_id,
                        "Order created"
                    );
                    return Ok(order_id);
                }
                InsertOutcome::IdTaken(e) => {
                    tracing::warn!(order_id = %order_id, attempt, "Order id collision, retrying");
                    last_collision = Some(e);
                }
            }
        }

        tracing::error!(attempts = MAX_ID_ATTEMPTS, "Could not allocate a unique order id");
        Err(match last_collision {
            Some(e) => StoreError::Persistence(e),
            None => StoreError::Internal("Could not allocate a unique order id".to_string()),
        })
    }

    /// Record the customer's payment reference and move the order to
    /// `processing`. Resubmitting while `processing` replaces the UTR.
    pub async fn submit_payment(&self, order_id: &OrderId, utr: &str) -> StoreResult<()> {
        let utr = utr.trim();
        if utr.is_empty() {
            return Err(StoreError::validation("UTR is required"));
        }

        let target = OrderStatus::Processing;
        let sources = OrderStatus::sources_of(target);
        if self.db.set_utr_if(order_id, utr, target, &sources).await? {
            tracing::info!(order_id = %order_id, "Payment submitted");
            return Ok(());
        }

        match self.db.current_status(order_id).await? {
            None => Err(not_found(order_id)),
            Some(from) => {
                tracing::warn!(order_id = %order_id, from = %from, "Payment rejected for order state");
                Err(StoreError::InvalidTransition { from, to: target })
            }
        }
    }

    /// Operator override: set any status from any status, audited.
    pub async fn set_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        actor: &str,
        reason: Option<&str>,
    ) -> StoreResult<()> {
        let previous = self
            .db
            .force_status(order_id, status, actor, reason)
            .await?
            .ok_or_else(|| not_found(order_id))?;

        if !previous.can_transition_to(status) && previous != status {
            tracing::warn!(
                order_id = %order_id,
                from = %previous,
                to = %status,
                actor,
                "Status forced outside the normal lifecycle"
            );
        } else {
            tracing::info!(order_id = %order_id, from = %previous, to = %status, actor, "Status set");
        }
        Ok(())
    }

    /// Operator partial update of telegram id, amount, UTR and status
    pub async fn patch_order(
        &self,
        order_id: &OrderId,
        patch: OrderPatch,
        actor: &str,
    ) -> StoreResult<()> {
        if patch.is_empty() {
            return Err(StoreError::validation("Nothing to update"));
        }
        let previous = self
            .db
            .apply_patch(order_id, &patch, actor)
            .await?
            .ok_or_else(|| not_found(order_id))?;

        tracing::info!(
            order_id = %order_id,
            from = %previous,
            to = ?patch.status,
            actor,
            "Order patched"
        );
        Ok(())
    }

    pub async fn delete_order(&self, order_id: &OrderId) -> StoreResult<()> {
        if !self.db.delete(order_id).await? {
            return Err(not_found(order_id));
        }
        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    pub async fn get_order(&self, order_id: &OrderId) -> StoreResult<OrderView> {
        self.db
            .get(order_id)
            .await?
            .ok_or_else(|| not_found(order_id))
    }

    /// A user's orders, newest first. Unknown users get an empty list.
    pub async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<OrderView>> {
        self.db.list_by_user(user_id).await
    }

    /// Every order with its owner's email, newest first
    pub async fn list_all(&self) -> StoreResult<Vec<AdminOrderView>> {
        self.db.list_all().await
    }

    /// Forced status changes for one order, oldest first
    pub async fn status_history(&self, order_id: &OrderId) -> StoreResult<Vec<StatusAuditEntry>> {
        let entries = self.db.history(order_id).await?;
        if entries.is_empty() && self.db.current_status(order_id).await?.is_none() {
            return Err(not_found(order_id));
        }
        Ok(entries)
    }

    pub async fn count_orders(&self) -> StoreResult<i64> {
        self.db.count().await
    }
}

fn not_found(order_id: &OrderId) -> StoreError {
    StoreError::not_found(format!("Order {} not found", order_id))
}
