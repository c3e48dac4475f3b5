//! Database operations for the point-of-sale `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `users` - Staff accounts with argon2 password hashes
//! - `auth_sessions` - HMAC digests of issued access/refresh tokens
//! - `products` - Menu catalogue
//! - `transactions` - Ledger entries (income/outcome)
//! - `orders`, `order_items` - Checkout records
//! - `cash` - Single running cash-on-hand row
//! - `notifications` - Inbox, published through `pg_notify` on insert
//!
//! Reads go through repository structs borrowing the pool. Writes that must
//! share a database transaction with other tables are free functions taking
//! a `&mut PgConnection`, so services can run them on `&mut *tx`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p kasir-cli -- migrate
//! ```

pub mod cash;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod sessions;
pub mod transactions;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cash::CashRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use sessions::SessionRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced row does not exist (foreign key violation).
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// A value was rejected by a check constraint.
    #[error("check violation: {0}")]
    CheckViolation(String),
}

/// Map constraint violations on a write to their repository meaning.
pub(crate) fn map_write_error(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::InvalidReference(
                db_err
                    .constraint()
                    .unwrap_or("referenced row does not exist")
                    .to_owned(),
            );
        }
        if db_err.is_check_violation() {
            return RepositoryError::CheckViolation(
                db_err.constraint().unwrap_or("check constraint").to_owned(),
            );
        }
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
