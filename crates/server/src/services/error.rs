//! Business rule errors shared by the services.

use thiserror::Error;

use kasir_core::MoneyError;

use crate::db::RepositoryError;

/// Message used when a ledger write finds no balance row.
pub const NO_CASH_ROW: &str = "No cash data found";

/// Errors raised by service methods.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input breaks a business rule.
    #[error("{0}")]
    Validation(String),

    /// A row the operation depends on is missing.
    #[error("{0}")]
    NotFound(String),

    /// Repository/database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

impl From<MoneyError> for ServiceError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}
