//! Kasir Core - Shared types library.
//!
//! This crate provides the domain vocabulary used by every Kasir component:
//! - `server` - JSON API over `PostgreSQL` (products, ledger, orders, cash)
//! - `cli` - migrations, user management and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Database encodings are available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - ids, money arithmetic, statuses, emails and auth sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
