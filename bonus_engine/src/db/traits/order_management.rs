use crate::{
    db_types::{OrderNumber, OrderSummary, UserId},
    db::traits::InsertOrderResult,
    OrderApiError,
};

/// Storage behaviour for the order intake side of the engine.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Registers `number` for `user` with an initial `NEW` status event. The order and its first event are written
    /// atomically.
    ///
    /// If the number is already registered (by anyone), nothing is written and the current owner is returned in
    /// [`InsertOrderResult::AlreadyExists`].
    async fn insert_order(&self, user: UserId, number: &OrderNumber) -> Result<InsertOrderResult, OrderApiError>;

    /// All orders submitted by `user`, with their current status, oldest upload first.
    async fn fetch_orders_for_user(&self, user: UserId) -> Result<Vec<OrderSummary>, OrderApiError>;

    async fn fetch_order_status(&self, number: &OrderNumber) -> Result<Option<OrderSummary>, OrderApiError>;
}
