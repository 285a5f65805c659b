use crate::helpers::{validate_order_number, NumberFormatError};
use bonus_common::Points;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

//--------------------------------------        UserId         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl UserId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------      OrderNumber      ---------------------------------------------------------
/// A purchase order number that has passed format and Luhn validation.
///
/// The only way to build one from untrusted input is [`OrderNumber::parse`]. Values read back from the database are
/// trusted, since nothing else is ever written there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn parse(s: &str) -> Result<Self, NumberFormatError> {
        validate_order_number(s)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderNumber {
    type Err = NumberFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The local lifecycle of an order. `Invalid` and `Processed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been accepted and the accrual service has not said anything about it yet.
    New,
    /// The accrual service knows about the order and is still calculating the reward.
    Processing,
    /// The accrual service refused to award points for the order.
    Invalid,
    /// The reward has been calculated and credited.
    Processed,
}

impl OrderStatusType {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "NEW"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Invalid => write!(f, "INVALID"),
            OrderStatusType::Processed => write!(f, "PROCESSED"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to NEW");
            OrderStatusType::New
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------     OrderSummary      ---------------------------------------------------------
/// An order together with its current status, as reported by the `order_current_status` view.
///
/// `accrual` is zero unless the order is `Processed`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OrderSummary {
    pub order_id: i64,
    pub number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatusType,
    pub accrual: Points,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   OrderStatusEvent    ---------------------------------------------------------
/// One row of an order's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OrderStatusEvent {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatusType,
    pub accrual: Points,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      LedgerEntry      ---------------------------------------------------------
/// A single immutable movement of points. Credits are positive, debits (withdrawals) are negative.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: UserId,
    pub order_number: OrderNumber,
    pub amount: Points,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn is_credit(&self) -> bool {
        self.amount.is_positive()
    }
}

//--------------------------------------       Balance         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Balance {
    /// The sum of all ledger entries for the user
    pub current: Points,
    /// The sum of the magnitudes of all debits for the user
    pub withdrawn: Points,
}

//--------------------------------------      Withdrawal       ---------------------------------------------------------
/// A debit, reported with a positive `sum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub order: OrderNumber,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

impl From<LedgerEntry> for Withdrawal {
    fn from(entry: LedgerEntry) -> Self {
        Self { order: entry.order_number, sum: entry.amount.abs(), processed_at: entry.created_at }
    }
}
