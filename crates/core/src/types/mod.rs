//! Core types for Kasir.
//!
//! This module provides type-safe wrappers for the point-of-sale domain.

pub mod email;
pub mod id;
pub mod money;
pub mod session;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{MONEY_SCALE, MoneyError, check_scale, line_total, order_total};
pub use session::AuthSession;
pub use status::*;
