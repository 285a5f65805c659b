//! # Storage contracts
//!
//! The traits in this module define what a database backend must provide for the bonus engine to work. The engine's
//! public API types are generic over these traits, which also lets the HTTP layer be tested against mocks.
//!
//! * [`AuthManagement`] stores users and looks them up by credential digest.
//! * [`OrderManagement`] registers order numbers and lists them with their current status.
//! * [`LedgerManagement`] appends credits and debits and derives balances from them.
//! * [`AccrualReconciliation`] drives the status history of pending orders.
mod accrual_reconciliation;
mod auth_management;
mod data_objects;
mod ledger_management;
mod order_management;

pub use accrual_reconciliation::AccrualReconciliation;
pub use auth_management::AuthManagement;
pub use data_objects::InsertOrderResult;
pub use ledger_management::LedgerManagement;
pub use order_management::OrderManagement;
