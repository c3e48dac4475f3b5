//! Cash-on-hand balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use kasir_core::CashId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CashBalance {
    pub id: CashId,
    pub nominal: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Stored balance compared with what the completed ledger implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub balance: Decimal,
    pub ledger_total: Decimal,
    /// `balance - ledger_total`; zero when the two agree.
    pub drift: Decimal,
}

impl Reconciliation {
    #[must_use]
    pub fn new(balance: Decimal, ledger_total: Decimal) -> Self {
        Self {
            balance,
            ledger_total,
            drift: balance - ledger_total,
        }
    }
}
