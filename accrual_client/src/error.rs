use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccrualApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the accrual service: {0}")]
    Transport(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("The accrual service is rate limiting requests. Retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },
    #[error("The accrual service failed with status {0}")]
    ServerError(u16),
    #[error("Unexpected response from the accrual service. Status {status}. {message}")]
    UnexpectedStatus { status: u16, message: String },
}

impl AccrualApiError {
    /// Transient errors are expected to clear up by themselves and are retried on the next poll cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::RateLimited { .. } | Self::ServerError(_))
    }
}
