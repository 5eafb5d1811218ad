//! Order module
//!
//! Orders are created `pending`, move to `processing` when the customer
//! submits a payment reference and are closed by an operator.

pub mod db;
pub mod state;
pub mod types;
pub mod workflow;

pub use state::{OrderStatus, UnknownStatus};
pub use types::{AdminOrderView, NewOrder, OrderId, OrderPatch, OrderView, StatusAuditEntry};
pub use workflow::{IdGenerator, MAX_ID_ATTEMPTS, OrderWorkflow};
