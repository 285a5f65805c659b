use bonus_common::Points;
use thiserror::Error;

use crate::{db_types::OrderNumber, helpers::NumberFormatError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Login and password must both be non-empty")]
    EmptyCredentials,
    #[error("The login '{0}' is already taken")]
    DuplicateLogin(String),
    #[error("Unknown login or wrong password")]
    InvalidCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid order number. {0}")]
    InvalidNumber(#[from] NumberFormatError),
    #[error("The user has not submitted any orders")]
    NoData,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid order number. {0}")]
    InvalidNumber(#[from] NumberFormatError),
    #[error("Amount must be strictly positive, but was {0}")]
    InvalidAmount(Points),
    #[error("Insufficient funds. Requested {requested}, but the balance is {available}")]
    InsufficientFunds { requested: Points, available: Points },
    #[error("Order {0} has already been credited")]
    AlreadyCredited(OrderNumber),
    #[error("The user has not made any withdrawals")]
    NoData,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Accrual for order {number} must not be negative, but was {accrual}")]
    NegativeAccrual { number: OrderNumber, accrual: Points },
}
