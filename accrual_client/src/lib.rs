//! Client for the external accrual service.
//!
//! The accrual service is the authority on how many bonus points an order earns. It exposes a single endpoint,
//! `GET /api/orders/{number}`, and may answer with
//! * `200` and a JSON body `{"order": "...", "status": "...", "accrual": 500}`,
//! * `204` when it has never heard of the order,
//! * `429` when it is rate limiting us (usually with a `Retry-After` header),
//! * `5xx` when it is having a bad day.
//!
//! [`AccrualApi`] is the `reqwest` implementation of the [`AccrualProvider`] trait. The accrual poller is written
//! against the trait so that tests can script the service's replies.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::{AccrualApi, AccrualProvider, MAX_RETRY_AFTER};
pub use config::{AccrualConfig, DEFAULT_ACCRUAL_ADDRESS, DEFAULT_REQUEST_TIMEOUT};
pub use data_objects::{AccrualReply, AccrualResponse};
pub use error::AccrualApiError;
