use bonus_common::Points;

use crate::db_types::OrderStatusType;

/// What happened when a user submitted an order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOrderResult {
    /// The number was new and is now registered to the user with status `NEW`.
    Accepted,
    /// The user had already submitted this number. Nothing changed.
    AlreadyAddedBySelf,
    /// Another user owns this number. Nothing changed.
    ConflictOtherUser,
}

/// What reconciling one accrual reply did to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Nothing was written. The order is (still) in the given status.
    Unchanged(OrderStatusType),
    /// A status event was appended.
    Advanced { from: OrderStatusType, to: OrderStatusType },
    /// The order moved to `PROCESSED`. `amount` was credited to the owner, unless it is zero.
    Credited { from: OrderStatusType, amount: Points },
}

impl TransitionOutcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}
