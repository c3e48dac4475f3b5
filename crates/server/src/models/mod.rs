//! Domain models returned by the API.
//!
//! Rows are decoded straight into these types with `sqlx::FromRow` where the
//! columns need no validation; users go through a row type so the stored
//! email is re-validated on the way out.

pub mod cash;
pub mod dashboard;
pub mod notification;
pub mod order;
pub mod product;
pub mod transaction;
pub mod user;

pub use cash::{CashBalance, Reconciliation};
pub use dashboard::{DailyIncome, TotalByType};
pub use notification::Notification;
pub use order::{CheckoutReceipt, Order, OrderDetail, OrderItem};
pub use product::{NewProduct, Product, ProductChanges};
pub use transaction::{NewTransaction, Transaction, TransactionChanges};
pub use user::{CurrentUser, User};
