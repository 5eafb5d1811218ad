use std::sync::Arc;

use crate::account::AccountService;
use crate::admin::AdminAuth;
use crate::catalog::CatalogService;
use crate::chat::ChatCompletion;
use crate::db::Database;
use crate::order::OrderWorkflow;

/// Shared gateway state
pub struct AppState {
    pub db: Arc<Database>,
    pub catalog: CatalogService,
    pub accounts: AccountService,
    pub orders: OrderWorkflow,
    pub admin: AdminAuth,
    /// `None` when no model API key is configured
    pub chat: Option<Arc<dyn ChatCompletion>>,
}

impl AppState {
    pub fn new(db: Arc<Database>, admin: AdminAuth, chat: Option<Arc<dyn ChatCompletion>>) -> Self {
        let pool = db.pool().clone();
        Self {
            catalog: CatalogService::new(pool.clone()),
            accounts: AccountService::new(pool.clone()),
            orders: OrderWorkflow::new(pool),
            db,
            admin,
            chat,
        }
    }

    /// Swap the order workflow (e.g. one with a scripted id source)
    pub fn with_orders(mut self, orders: OrderWorkflow) -> Self {
        self.orders = orders;
        self
    }
}
