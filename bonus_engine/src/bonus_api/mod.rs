//! The public API of the bonus engine.
//!
//! Each API object wraps a storage backend and adds validation, hashing and decision logic on top of it. They are
//! cheap to clone if the backend is.
pub mod auth_api;
pub mod errors;
pub mod ledger_api;
pub mod order_intake_api;
pub mod order_objects;
pub mod reconciliation_api;
