use std::fmt::Debug;

use bonus_common::{AccrualStatus, Points};
use log::{debug, info, warn};

use crate::{
    db_types::{OrderNumber, OrderStatusEvent, OrderStatusType, OrderSummary},
    order_objects::TransitionOutcome,
    status_machine::{next_transition, Transition},
    AccrualReconciliation, ReconciliationError,
};

/// `ReconciliationApi` applies accrual service replies to local orders.
///
/// Every change is compare-and-set against the status the decision was based on, so replaying the same reply, or
/// racing two reconcilers on the same order, never produces a second transition or a second credit.
pub struct ReconciliationApi<B> {
    db: B,
}

impl<B: Debug> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({:?})", self.db)
    }
}

impl<B: Clone> Clone for ReconciliationApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> ReconciliationApi<B>
where B: AccrualReconciliation
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Orders that still need to be checked with the accrual service (`NEW` or `PROCESSING`).
    pub async fn pending_orders(&self) -> Result<Vec<OrderSummary>, ReconciliationError> {
        self.db.fetch_pending_orders().await
    }

    /// Applies one accrual reply for `number`.
    ///
    /// `accrual` is only meaningful for `PROCESSED` replies; a missing accrual is treated as zero, in which case the
    /// order is finalised without a ledger entry. Negative accruals are rejected and nothing is written.
    pub async fn apply_accrual(
        &self,
        number: &OrderNumber,
        reported: AccrualStatus,
        accrual: Option<Points>,
    ) -> Result<TransitionOutcome, ReconciliationError> {
        let order = self
            .db
            .fetch_order_summary(number)
            .await?
            .ok_or_else(|| ReconciliationError::OrderNotFound(number.clone()))?;
        let from = order.status;
        let outcome = match next_transition(from, reported) {
            Transition::Stay => TransitionOutcome::Unchanged(from),
            Transition::AdvanceTo(OrderStatusType::Processed) => {
                let amount = accrual.unwrap_or_default();
                if amount < Points::default() {
                    warn!("🔄️ Accrual service reported a negative accrual ({amount}) for order {number}. Ignoring.");
                    return Err(ReconciliationError::NegativeAccrual { number: number.clone(), accrual: amount });
                }
                if self.db.complete_order(&order, amount).await? {
                    info!("🔄️ Order {number} processed. {amount} points credited to user {}", order.user_id);
                    TransitionOutcome::Credited { from, amount }
                } else {
                    self.current_status(number, from).await?
                }
            },
            Transition::AdvanceTo(to) => {
                if self.db.append_status_event(order.order_id, from, to).await? {
                    info!("🔄️ Order {number} moved from {from} to {to}");
                    TransitionOutcome::Advanced { from, to }
                } else {
                    self.current_status(number, from).await?
                }
            },
        };
        Ok(outcome)
    }

    pub async fn status_history(&self, number: &OrderNumber) -> Result<Vec<OrderStatusEvent>, ReconciliationError> {
        self.db.fetch_status_history(number).await
    }

    // Someone else changed the order between our read and our write.
    async fn current_status(
        &self,
        number: &OrderNumber,
        fallback: OrderStatusType,
    ) -> Result<TransitionOutcome, ReconciliationError> {
        let status = self.db.fetch_order_summary(number).await?.map(|o| o.status).unwrap_or(fallback);
        debug!("🔄️ Order {number} changed concurrently. It is now {status}");
        Ok(TransitionOutcome::Unchanged(status))
    }
}
