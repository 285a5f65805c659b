use std::fmt::Debug;

use bonus_common::Points;
use log::*;
use sqlx::SqlitePool;

use super::{ledger, new_pool, order_status, orders, users, SqliteDatabaseError};
use crate::{
    db::{
        sqlite::orders::OrderQueryFilter,
        traits::{AccrualReconciliation, AuthManagement, InsertOrderResult, LedgerManagement, OrderManagement},
    },
    db_types::{
        Balance, LedgerEntry, OrderNumber, OrderStatusEvent, OrderStatusType, OrderSummary, UserId, Withdrawal,
    },
    AuthApiError, LedgerApiError, OrderApiError, ReconciliationError,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<UserId, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let id = users::insert_user(login, password_hash, &mut conn).await?;
        Ok(id)
    }

    async fn fetch_user_id(&self, login: &str, password_hash: &str) -> Result<Option<UserId>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let id = users::fetch_user_id(login, password_hash, &mut conn).await?;
        Ok(id)
    }
}

impl OrderManagement for SqliteDatabase {
    /// Inserts the order and its `NEW` status event in a single transaction. If the number is taken, the transaction
    /// is rolled back and the existing owner is looked up instead.
    async fn insert_order(&self, user: UserId, number: &OrderNumber) -> Result<InsertOrderResult, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        match orders::insert_order(user, number, &mut tx).await {
            Ok(id) => {
                order_status::insert_status_event(id, OrderStatusType::New, &mut tx).await?;
                tx.commit().await?;
                debug!("🗃️ Order {number} has been saved in the DB with id {id}");
                Ok(InsertOrderResult::Inserted(id))
            },
            Err(SqliteDatabaseError::DuplicateOrder(_)) => {
                tx.rollback().await?;
                let mut conn = self.pool.acquire().await?;
                let owner = orders::fetch_order_owner(number, &mut conn).await?.ok_or_else(|| {
                    OrderApiError::DatabaseError(format!("Order {number} was reported as a duplicate but has no owner"))
                })?;
                trace!("🗃️ Order {number} already exists and belongs to user {owner}");
                Ok(InsertOrderResult::AlreadyExists { owner })
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_orders_for_user(&self, user: UserId) -> Result<Vec<OrderSummary>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders(OrderQueryFilter::default().with_user_id(user), &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order_status(&self, number: &OrderNumber) -> Result<Option<OrderSummary>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn credit(&self, user: UserId, order: &OrderNumber, amount: Points) -> Result<LedgerEntry, LedgerApiError> {
        if !amount.is_positive() {
            return Err(LedgerApiError::InvalidAmount(amount));
        }
        let mut conn = self.pool.acquire().await?;
        match ledger::insert_credit(user, order, amount, &mut conn).await {
            Ok(entry) => Ok(entry),
            Err(SqliteDatabaseError::DuplicateCredit(_)) => Err(LedgerApiError::AlreadyCredited(order.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn debit(&self, user: UserId, order: &OrderNumber, amount: Points) -> Result<LedgerEntry, LedgerApiError> {
        if !amount.is_positive() {
            return Err(LedgerApiError::InvalidAmount(amount));
        }
        let mut conn = self.pool.acquire().await?;
        match ledger::insert_debit_if_covered(user, order, amount, &mut conn).await? {
            Some(entry) => Ok(entry),
            None => {
                let available = ledger::fetch_balance(user, &mut conn).await?.current;
                debug!("📒️ User {user} cannot withdraw {amount}. Balance is {available}");
                Err(LedgerApiError::InsufficientFunds { requested: amount, available })
            },
        }
    }

    async fn fetch_balance(&self, user: UserId) -> Result<Balance, LedgerApiError> {
        let mut conn = self.pool.acquire().await?;
        let balance = ledger::fetch_balance(user, &mut conn).await?;
        Ok(balance)
    }

    async fn fetch_withdrawals(&self, user: UserId) -> Result<Vec<Withdrawal>, LedgerApiError> {
        let mut conn = self.pool.acquire().await?;
        let debits = ledger::fetch_entries(user, true, &mut conn).await?;
        Ok(debits.into_iter().map(Withdrawal::from).collect())
    }

    async fn fetch_ledger_entries(&self, user: UserId) -> Result<Vec<LedgerEntry>, LedgerApiError> {
        let mut conn = self.pool.acquire().await?;
        let entries = ledger::fetch_entries(user, false, &mut conn).await?;
        Ok(entries)
    }
}

impl AccrualReconciliation for SqliteDatabase {
    async fn fetch_pending_orders(&self) -> Result<Vec<OrderSummary>, ReconciliationError> {
        let query =
            OrderQueryFilter::default().with_status(OrderStatusType::New).with_status(OrderStatusType::Processing);
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order_summary(&self, number: &OrderNumber) -> Result<Option<OrderSummary>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn append_status_event(
        &self,
        order_id: i64,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<bool, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let applied =
            order_status::append_if_current(order_id, expected, new_status, Points::default(), &mut conn).await?;
        Ok(applied)
    }

    /// Appends the `PROCESSED` event and the ledger credit in one transaction. If either write finds that another
    /// writer got there first, the whole transaction is rolled back.
    async fn complete_order(&self, order: &OrderSummary, accrual: Points) -> Result<bool, ReconciliationError> {
        let mut tx = self.pool.begin().await?;
        let applied = order_status::append_if_current(
            order.order_id,
            order.status,
            OrderStatusType::Processed,
            accrual,
            &mut tx,
        )
        .await?;
        if !applied {
            tx.rollback().await?;
            return Ok(false);
        }
        if accrual.is_positive() {
            match ledger::insert_credit(order.user_id, &order.number, accrual, &mut tx).await {
                Ok(_) => {},
                Err(SqliteDatabaseError::DuplicateCredit(_)) => {
                    warn!("📒️ Order {} was already credited. Rolling back the status change.", order.number);
                    tx.rollback().await?;
                    return Ok(false);
                },
                Err(e) => return Err(e.into()),
            }
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn fetch_status_history(&self, number: &OrderNumber) -> Result<Vec<OrderStatusEvent>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let events = order_status::fetch_status_history(number, &mut conn).await?;
        Ok(events)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Migrations are embedded in the binary.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
