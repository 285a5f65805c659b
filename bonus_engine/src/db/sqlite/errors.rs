use thiserror::Error;

use crate::{AuthApiError, LedgerApiError, OrderApiError, ReconciliationError};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("The login '{0}' is already taken")]
    DuplicateLogin(String),
    #[error("Order {0} has already been registered")]
    DuplicateOrder(String),
    #[error("Order {0} has already been credited")]
    DuplicateCredit(String),
}

impl From<SqliteDatabaseError> for AuthApiError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::DuplicateLogin(login) => AuthApiError::DuplicateLogin(login),
            e => AuthApiError::DatabaseError(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

impl From<SqliteDatabaseError> for OrderApiError {
    fn from(e: SqliteDatabaseError) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

impl From<SqliteDatabaseError> for LedgerApiError {
    fn from(e: SqliteDatabaseError) -> Self {
        LedgerApiError::DatabaseError(e.to_string())
    }
}

impl From<sqlx::Error> for LedgerApiError {
    fn from(e: sqlx::Error) -> Self {
        LedgerApiError::DatabaseError(e.to_string())
    }
}

impl From<SqliteDatabaseError> for ReconciliationError {
    fn from(e: SqliteDatabaseError) -> Self {
        ReconciliationError::DatabaseError(e.to_string())
    }
}

impl From<sqlx::Error> for ReconciliationError {
    fn from(e: sqlx::Error) -> Self {
        ReconciliationError::DatabaseError(e.to_string())
    }
}

/// True if the error is a violated UNIQUE constraint or unique index.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
