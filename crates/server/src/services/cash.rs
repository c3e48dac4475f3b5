//! Cash-on-hand reads, the admin override and reconciliation.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use kasir_core::{CashId, check_scale};

use super::{NO_CASH_ROW, ServiceError};
use crate::db::{CashRepository, RepositoryError, TransactionRepository};
use crate::models::{CashBalance, Reconciliation};

/// Body of the cash edit: a bare number or `{ "nominal": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CashUpdate {
    Bare(Decimal),
    Wrapped { nominal: Decimal },
}

impl CashUpdate {
    #[must_use]
    pub const fn nominal(self) -> Decimal {
        match self {
            Self::Bare(nominal) | Self::Wrapped { nominal } => nominal,
        }
    }
}

/// Cash service.
pub struct CashService<'a> {
    pool: &'a PgPool,
}

impl<'a> CashService<'a> {
    /// Create a new cash service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All balance rows.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<CashBalance>, ServiceError> {
        Ok(CashRepository::new(self.pool).list().await?)
    }

    /// Overwrite a balance.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the row does not exist and
    /// `ServiceError::Validation` for a nominal with sub-cent digits.
    pub async fn set(&self, id: CashId, update: CashUpdate) -> Result<CashBalance, ServiceError> {
        let nominal = check_scale(update.nominal())?;
        let balance = CashRepository::new(self.pool)
            .set_nominal(id, nominal)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound(NO_CASH_ROW.to_owned()),
                other => other.into(),
            })?;

        tracing::warn!(cash_id = %id, nominal = %balance.nominal, "Cash balance overridden");
        Ok(balance)
    }

    /// Compare the stored balance with the completed ledger.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no cash row.
    pub async fn reconcile(&self) -> Result<Reconciliation, ServiceError> {
        let balance = CashRepository::new(self.pool)
            .list()
            .await?
            .first()
            .map(|row| row.nominal)
            .ok_or_else(|| ServiceError::NotFound(NO_CASH_ROW.to_owned()))?;
        let ledger_total = TransactionRepository::new(self.pool).completed_net().await?;

        let report = Reconciliation::new(balance, ledger_total);
        if !report.drift.is_zero() {
            tracing::warn!(drift = %report.drift, "Cash balance differs from ledger");
        }
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_update_accepts_both_shapes() {
        let bare: CashUpdate = serde_json::from_str("150000").unwrap();
        let wrapped: CashUpdate = serde_json::from_str(r#"{"nominal": 150000}"#).unwrap();
        assert_eq!(bare.nominal(), Decimal::from(150_000));
        assert_eq!(wrapped.nominal(), Decimal::from(150_000));
    }

    #[test]
    fn test_cash_update_rejects_other_shapes() {
        assert!(serde_json::from_str::<CashUpdate>(r#"{"amount": 1}"#).is_err());
        assert!(serde_json::from_str::<CashUpdate>(r#""lots""#).is_err());
    }

    #[test]
    fn test_reconciliation_drift() {
        let report = Reconciliation::new(Decimal::from(120_000), Decimal::from(100_000));
        assert_eq!(report.drift, Decimal::from(20_000));

        let balanced = Reconciliation::new(Decimal::from(5), Decimal::from(5));
        assert!(balanced.drift.is_zero());
    }
}
