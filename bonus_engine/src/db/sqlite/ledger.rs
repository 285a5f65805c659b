use bonus_common::Points;
use log::debug;
use sqlx::SqliteConnection;

use super::errors::is_unique_violation;
use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Balance, LedgerEntry, OrderNumber, UserId},
};

/// Appends a credit. `amount` must be positive. A second credit for the same order number violates the single-credit
/// index and yields [`SqliteDatabaseError::DuplicateCredit`].
pub async fn insert_credit(
    user: UserId,
    order: &OrderNumber,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, SqliteDatabaseError> {
    let result = sqlx::query_as::<_, LedgerEntry>(
        r#"
        INSERT INTO ledger (user_id, order_number, amount) VALUES ($1, $2, $3)
        RETURNING id, user_id, order_number, amount, created_at
        "#,
    )
    .bind(user)
    .bind(order)
    .bind(amount)
    .fetch_one(conn)
    .await;
    match result {
        Ok(entry) => {
            debug!("📒️ Credited {amount} to user {user} for order {order}");
            Ok(entry)
        },
        Err(e) if is_unique_violation(&e) => Err(SqliteDatabaseError::DuplicateCredit(order.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Appends a debit of `amount` (positive; stored negated) if, and only if, the user's balance covers it.
///
/// The balance check is part of the INSERT statement itself, and SQLite serialises writers, so two concurrent debits
/// cannot both pass the check against the same balance. Returns `None` if the balance was insufficient.
pub async fn insert_debit_if_covered(
    user: UserId,
    order: &OrderNumber,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, SqliteDatabaseError> {
    let entry = sqlx::query_as::<_, LedgerEntry>(
        r#"
        INSERT INTO ledger (user_id, order_number, amount)
        SELECT $1, $2, $3
        WHERE (SELECT COALESCE(SUM(amount), 0) FROM ledger WHERE user_id = $1) >= $4
        RETURNING id, user_id, order_number, amount, created_at
        "#,
    )
    .bind(user)
    .bind(order)
    .bind(-amount)
    .bind(amount)
    .fetch_optional(conn)
    .await?;
    if entry.is_some() {
        debug!("📒️ Debited {amount} from user {user} for order {order}");
    }
    Ok(entry)
}

pub async fn fetch_balance(user: UserId, conn: &mut SqliteConnection) -> Result<Balance, SqliteDatabaseError> {
    let balance = sqlx::query_as::<_, Balance>(
        r#"
        SELECT
            COALESCE(SUM(amount), 0) AS current,
            COALESCE(SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END), 0) AS withdrawn
        FROM ledger
        WHERE user_id = $1
        "#,
    )
    .bind(user)
    .fetch_one(conn)
    .await?;
    Ok(balance)
}

/// Fetches the user's ledger entries, oldest first. With `debits_only`, credits are left out.
pub async fn fetch_entries(
    user: UserId,
    debits_only: bool,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerEntry>, SqliteDatabaseError> {
    let entries = sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT id, user_id, order_number, amount, created_at
        FROM ledger
        WHERE user_id = $1 AND ($2 = 0 OR amount < 0)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(user)
    .bind(debits_only)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}
