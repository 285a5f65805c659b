use std::fmt::Debug;

use log::{debug, info};

use crate::{
    db_types::{OrderNumber, OrderSummary, UserId},
    order_objects::SubmitOrderResult,
    InsertOrderResult, OrderApiError, OrderManagement,
};

/// `OrderIntakeApi` accepts order numbers from users and lists them back.
pub struct OrderIntakeApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderIntakeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderIntakeApi ({:?})", self.db)
    }
}

impl<B: Clone> Clone for OrderIntakeApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> OrderIntakeApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Validates `number` and registers it to `user`.
    ///
    /// Submitting a number twice is harmless. The outcome tells the caller whether the number was new, already the
    /// user's own, or owned by somebody else.
    pub async fn submit(&self, user: UserId, number: &str) -> Result<SubmitOrderResult, OrderApiError> {
        let number = OrderNumber::parse(number).map_err(|e| {
            debug!("📦️ User {user} submitted an invalid order number '{number}'. {e}");
            OrderApiError::InvalidNumber(e)
        })?;
        let result = match self.db.insert_order(user, &number).await? {
            InsertOrderResult::Inserted(id) => {
                info!("📦️ Order {number} accepted for user {user} (id {id})");
                SubmitOrderResult::Accepted
            },
            InsertOrderResult::AlreadyExists { owner } if owner == user => SubmitOrderResult::AlreadyAddedBySelf,
            InsertOrderResult::AlreadyExists { owner } => {
                info!("📦️ User {user} tried to submit order {number}, which belongs to user {owner}");
                SubmitOrderResult::ConflictOtherUser
            },
        };
        Ok(result)
    }

    /// The user's orders with their current status, oldest upload first. Fails with [`OrderApiError::NoData`] if
    /// the user has not submitted anything yet.
    pub async fn orders_for_user(&self, user: UserId) -> Result<Vec<OrderSummary>, OrderApiError> {
        let orders = self.db.fetch_orders_for_user(user).await?;
        if orders.is_empty() {
            return Err(OrderApiError::NoData);
        }
        Ok(orders)
    }

    pub async fn order_by_number(&self, number: &OrderNumber) -> Result<Option<OrderSummary>, OrderApiError> {
        self.db.fetch_order_status(number).await
    }
}
