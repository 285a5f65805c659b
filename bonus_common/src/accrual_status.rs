use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status vocabulary of the external accrual service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    /// The order is known to the accrual service, but no calculation has started.
    Registered,
    /// The accrual is being calculated.
    Processing,
    /// The order will never earn an accrual.
    Invalid,
    /// The calculation is complete. This is the only status that carries an accrual amount.
    Processed,
}

impl AccrualStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }
}

impl Display for AccrualStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "REGISTERED"),
            Self::Processing => write!(f, "PROCESSING"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Processed => write!(f, "PROCESSED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid accrual status: {0}")]
pub struct AccrualStatusParseError(String);

impl FromStr for AccrualStatus {
    type Err = AccrualStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTERED" => Ok(Self::Registered),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(AccrualStatusParseError(s.to_string())),
        }
    }
}
