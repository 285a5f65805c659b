use bonus_common::{AccrualStatus, Points};
use serde::{Deserialize, Serialize};

/// The body of a `200` reply from the accrual service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualResponse {
    pub order: String,
    pub status: AccrualStatus,
    /// Only present for `PROCESSED` orders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
}

impl AccrualResponse {
    pub fn new(order: &str, status: AccrualStatus, accrual: Option<Points>) -> Self {
        Self { order: order.to_string(), status, accrual }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualReply {
    Found(AccrualResponse),
    /// `204 No Content`: the accrual service does not know this order (yet).
    NotRegistered,
}
