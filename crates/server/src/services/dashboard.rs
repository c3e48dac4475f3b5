//! Dashboard aggregates.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::ServiceError;
use crate::db::TransactionRepository;
use crate::models::{DailyIncome, TotalByType};

/// Income and outcome totals as chart slices, income first.
#[must_use]
pub fn income_outcome(income: Decimal, outcome: Decimal) -> Vec<TotalByType> {
    vec![
        TotalByType {
            name: "Income",
            value: income,
        },
        TotalByType {
            name: "Outcome",
            value: outcome,
        },
    ]
}

/// Sum income per calendar day in `offset`, ascending by date.
#[must_use]
pub fn daily_income<I>(entries: I, offset: FixedOffset) -> Vec<DailyIncome>
where
    I: IntoIterator<Item = (DateTime<Utc>, Decimal)>,
{
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for (created_at, amount) in entries {
        let day = created_at.with_timezone(&offset).date_naive();
        *days.entry(day).or_default() += amount;
    }

    days.into_iter()
        .map(|(day, income)| DailyIncome {
            date: day.format("%Y-%m-%d").to_string(),
            income,
        })
        .collect()
}

/// Dashboard service.
pub struct DashboardService<'a> {
    pool: &'a PgPool,
    offset: FixedOffset,
}

impl<'a> DashboardService<'a> {
    /// Create a dashboard service bucketing days in `offset`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, offset: FixedOffset) -> Self {
        Self { pool, offset }
    }

    /// Income vs outcome over the whole ledger.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn income_outcome(&self) -> Result<Vec<TotalByType>, ServiceError> {
        let (income, outcome) = TransactionRepository::new(self.pool).totals_by_type().await?;
        Ok(income_outcome(income, outcome))
    }

    /// Income per business day.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn daily_income(&self) -> Result<Vec<DailyIncome>, ServiceError> {
        let entries = TransactionRepository::new(self.pool).income_entries().await?;
        Ok(daily_income(entries, self.offset))
    }
}
