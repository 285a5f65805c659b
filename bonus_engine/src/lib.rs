//! Bonus Engine
//!
//! The bonus engine is the core of the loyalty points server. Users submit purchase order numbers, an external accrual
//! service decides how many bonus points each order earns, and users spend those points by withdrawing them against
//! new orders.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly. Instead, use the public API provided by the engine. The exception is the data types used
//!    in the database. These are defined in the `db_types` module and are public.
//! 2. The engine's public API ([`mod@bonus_api`]):
//!    * [`AuthApi`] registers and authenticates users,
//!    * [`OrderIntakeApi`] validates and registers order numbers,
//!    * [`LedgerApi`] exposes balances, withdrawals and the append-only ledger,
//!    * [`ReconciliationApi`] drives the order status machine from accrual service replies.
//!
//! ## The ledger
//! Balances are never stored. Every credit (a processed accrual) and every debit (a withdrawal) is an immutable ledger
//! entry, and `current = Σ amount`, `withdrawn = Σ |amount| over debits` are computed on demand.
//!
//! ## Order status
//! Order status is an append-only history. The current status is the most recent event. See [`status_machine`] for
//! the transitions that the accrual poller may apply.
mod db;

pub mod bonus_api;
pub mod db_types;
pub mod helpers;
pub mod status_machine;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use bonus_api::{
    auth_api::AuthApi,
    errors::{AuthApiError, LedgerApiError, OrderApiError, ReconciliationError},
    ledger_api::LedgerApi,
    order_intake_api::OrderIntakeApi,
    order_objects,
    reconciliation_api::ReconciliationApi,
};
#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{AccrualReconciliation, AuthManagement, InsertOrderResult, LedgerManagement, OrderManagement};
