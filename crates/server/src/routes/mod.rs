//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/signup            - Create a cashier account
//! POST   /api/auth/login             - Issue tokens (rate limited)
//! POST   /api/auth/refresh           - Rotate tokens
//! POST   /api/auth/logout            - Close the current session
//! GET    /api/auth/me                - Current user
//!
//! # Products
//! GET    /api/products               - List (by name)
//! POST   /api/products               - Create
//! GET    /api/products/{id}          - Detail
//! PUT    /api/products/{id}          - Partial update
//! DELETE /api/products/{id}          - Delete
//!
//! # Ledger
//! GET    /api/transactions           - List (newest first)
//! POST   /api/transactions           - Record an entry
//! PUT    /api/transactions/{id}      - Partial update
//! DELETE /api/transactions/{id}      - Delete
//!
//! # Orders
//! GET    /api/orders                 - List (newest first)
//! POST   /api/orders                 - Checkout
//! GET    /api/orders/{id}            - Order with items
//!
//! # Cash
//! GET    /api/cash                   - Balance rows
//! PUT    /api/cash/{id}              - Override balance (admin)
//! GET    /api/cash/reconciliation    - Balance vs ledger
//!
//! # Notifications
//! GET    /api/notifications          - Unread, newest first
//! POST   /api/notifications/test     - Insert the test notification
//! POST   /api/notifications/{id}/read - Mark read
//! GET    /api/notifications/stream   - SSE feed
//!
//! # Dashboard
//! GET    /api/dashboard/income-outcome
//! GET    /api/dashboard/daily-income
//! GET    /api/dashboard/cash-on-hand
//! ```

pub mod auth;
pub mod cash;
pub mod dashboard;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod transactions;

use axum::Router;
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections use the API error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Build the API router.
///
/// `trust_proxy` lets the login rate limit key on proxy IP headers.
pub fn routes(trust_proxy: bool) -> Router<AppState> {
    Router::new()
        .merge(auth::router(trust_proxy))
        .merge(products::router())
        .merge(transactions::router())
        .merge(orders::router())
        .merge(cash::router())
        .merge(notifications::router())
        .merge(dashboard::router())
}
