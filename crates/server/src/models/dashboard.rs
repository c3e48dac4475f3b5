//! Dashboard report rows.

use rust_decimal::Decimal;
use serde::Serialize;

/// One slice of the income/outcome chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalByType {
    pub name: &'static str,
    pub value: Decimal,
}

/// Income summed over one business day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyIncome {
    /// `YYYY-MM-DD` in the business offset.
    pub date: String,
    pub income: Decimal,
}
