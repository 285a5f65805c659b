use bonus_common::Points;
use sqlx::SqliteConnection;

use super::errors::is_unique_violation;
use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{OrderNumber, OrderStatusEvent, OrderStatusType},
};

/// Unconditionally appends a status event. Only used for the initial `NEW` event of a freshly inserted order.
pub async fn insert_status_event(
    order_id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query("INSERT INTO order_status_events (order_id, status) VALUES ($1, $2)")
        .bind(order_id)
        .bind(status)
        .execute(conn)
        .await?;
    Ok(())
}

/// Appends a `new_status` event carrying `accrual`, but only if the order's latest event still has status
/// `expected`. The check and the insert are a single statement.
///
/// Returns `false` when the order had moved on, including the case where another writer has already recorded a final
/// status (caught by the unique index on final events).
pub async fn append_if_current(
    order_id: i64,
    expected: OrderStatusType,
    new_status: OrderStatusType,
    accrual: Points,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
        INSERT INTO order_status_events (order_id, status, accrual)
        SELECT $1, $2, $3
        WHERE (
            SELECT status FROM order_status_events
            WHERE order_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        ) = $4
        "#,
    )
    .bind(order_id)
    .bind(new_status)
    .bind(accrual)
    .bind(expected)
    .execute(conn)
    .await;
    match result {
        Ok(r) => Ok(r.rows_affected() == 1),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_status_history(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderStatusEvent>, SqliteDatabaseError> {
    let events = sqlx::query_as::<_, OrderStatusEvent>(
        r#"
        SELECT e.id, e.order_id, e.status, e.accrual, e.created_at
        FROM order_status_events e JOIN orders o ON o.id = e.order_id
        WHERE o.number = $1
        ORDER BY e.created_at ASC, e.id ASC
        "#,
    )
    .bind(number)
    .fetch_all(conn)
    .await?;
    Ok(events)
}
