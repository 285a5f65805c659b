//! The order status machine.
//!
//! Local statuses only move forward:
//!
//! ```text
//!   NEW ──► PROCESSING ──► PROCESSED
//!    │           │
//!    └───────────┴──────► INVALID
//!    └──────────────────► PROCESSED
//! ```
//!
//! The accrual service's `REGISTERED` status has no local counterpart; an order it reports as registered is treated
//! as being processed. Once an order reaches `INVALID` or `PROCESSED`, nothing the accrual service says changes it.
//!
//! This module is pure. Persisting a transition (and crediting the ledger on `PROCESSED`) is the job of
//! [`crate::ReconciliationApi`].
use crate::db_types::OrderStatusType;
use bonus_common::AccrualStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The reported status carries no new information.
    Stay,
    /// Append a status event moving the order to the given status.
    AdvanceTo(OrderStatusType),
}

/// Decides what to do with an order whose current local status is `current` after the accrual service reported
/// `reported` for it.
pub fn next_transition(current: OrderStatusType, reported: AccrualStatus) -> Transition {
    use OrderStatusType::{Invalid, New, Processed, Processing};
    match (current, reported) {
        (Invalid | Processed, _) => Transition::Stay,
        (New, AccrualStatus::Registered | AccrualStatus::Processing) => Transition::AdvanceTo(Processing),
        (Processing, AccrualStatus::Registered | AccrualStatus::Processing) => Transition::Stay,
        (New | Processing, AccrualStatus::Invalid) => Transition::AdvanceTo(Invalid),
        (New | Processing, AccrualStatus::Processed) => Transition::AdvanceTo(Processed),
    }
}
