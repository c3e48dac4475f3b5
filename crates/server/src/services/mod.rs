//! Business logic services.
//!
//! Each service borrows the pool and wraps one use case. Multi-table writes
//! open a single sqlx transaction and pass `&mut *tx` to the `db` write
//! functions, so a failure at any step rolls every step back.

pub mod auth;
pub mod cash;
pub mod checkout;
pub mod dashboard;
pub mod ledger;
pub mod notifications;

mod error;

pub use error::{NO_CASH_ROW, ServiceError};
