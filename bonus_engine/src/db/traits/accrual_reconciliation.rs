use bonus_common::Points;

use crate::{
    db_types::{OrderNumber, OrderStatusEvent, OrderStatusType, OrderSummary},
    ReconciliationError,
};

/// Storage behaviour needed by the accrual poller.
///
/// Status changes are compare-and-set: an event is only appended if the order's current status is still the one the
/// caller based its decision on. This makes concurrent or repeated reconciliation of the same order harmless.
#[allow(async_fn_in_trait)]
pub trait AccrualReconciliation {
    /// All orders whose current status is `NEW` or `PROCESSING`, oldest upload first.
    async fn fetch_pending_orders(&self) -> Result<Vec<OrderSummary>, ReconciliationError>;

    async fn fetch_order_summary(&self, number: &OrderNumber) -> Result<Option<OrderSummary>, ReconciliationError>;

    /// Appends a `new_status` event (with zero accrual) if the order's current status is `expected`. Returns whether
    /// the event was written.
    async fn append_status_event(
        &self,
        order_id: i64,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<bool, ReconciliationError>;

    /// Moves `order` to `PROCESSED`, recording `accrual`, and credits the owner's ledger with `accrual` when it is
    /// positive. Both writes happen in one transaction, and only if the order's current status is still
    /// `order.status`. Returns whether anything was written.
    async fn complete_order(&self, order: &OrderSummary, accrual: Points) -> Result<bool, ReconciliationError>;

    /// The full status history of an order, oldest first.
    async fn fetch_status_history(&self, number: &OrderNumber) -> Result<Vec<OrderStatusEvent>, ReconciliationError>;
}
