use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use super::errors::is_unique_violation;
use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{OrderNumber, OrderStatusType, OrderSummary, UserId},
};

/// Inserts a new order row. This is not atomic with the order's first status event. Run it inside a transaction and
/// pass `&mut tx` as the connection argument.
///
/// A number that already exists yields [`SqliteDatabaseError::DuplicateOrder`].
pub async fn insert_order(
    user: UserId,
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let result = sqlx::query_scalar::<_, i64>("INSERT INTO orders (number, user_id) VALUES ($1, $2) RETURNING id")
        .bind(number)
        .bind(user)
        .fetch_one(conn)
        .await;
    match result {
        Ok(id) => Ok(id),
        Err(e) if is_unique_violation(&e) => Err(SqliteDatabaseError::DuplicateOrder(number.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Returns the id of the user who submitted `number`, if anyone has.
pub async fn fetch_order_owner(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<UserId>, SqliteDatabaseError> {
    let owner = sqlx::query_scalar::<_, UserId>("SELECT user_id FROM orders WHERE number = $1")
        .bind(number)
        .fetch_optional(conn)
        .await?;
    Ok(owner)
}

#[derive(Debug, Clone, Default)]
pub struct OrderQueryFilter {
    number: Option<OrderNumber>,
    user_id: Option<UserId>,
    statuses: Vec<OrderStatusType>,
}

impl OrderQueryFilter {
    pub fn with_number(mut self, number: OrderNumber) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.user_id.is_none() && self.statuses.is_empty()
    }
}

/// Fetches orders, with their current status, according to the criteria in the `OrderQueryFilter`.
///
/// Resulting orders are sorted by upload time in ascending order.
pub async fn fetch_orders(
    query: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderSummary>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT order_id, number, user_id, status, accrual, uploaded_at, updated_at FROM order_current_status
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(number) = query.number {
        where_clause.push("number = ");
        where_clause.push_bind_unseparated(number);
    }
    if let Some(user_id) = query.user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(user_id);
    }
    if !query.statuses.is_empty() {
        where_clause.push("status IN (");
        for (i, status) in query.statuses.into_iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(status);
        }
        where_clause.push_unseparated(")");
    }
    builder.push(" ORDER BY uploaded_at ASC, order_id ASC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<OrderSummary>().fetch_all(conn).await?;
    trace!("🗃️ fetch_orders returned {} orders", orders.len());
    Ok(orders)
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderSummary>, SqliteDatabaseError> {
    let query = OrderQueryFilter::default().with_number(number.clone());
    let mut orders = fetch_orders(query, conn).await?;
    Ok(orders.pop())
}
