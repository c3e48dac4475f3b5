//! Ledger entries and their effect on the cash balance.
//!
//! Only completed entries count toward cash. Every write moves the balance
//! by exactly the change in effect it causes, inside the same database
//! transaction as the ledger row.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use kasir_core::{TransactionId, TransactionStatus, TransactionType, UserId, check_scale};

use super::notifications::TRANSACTION_CREATED;
use super::{NO_CASH_ROW, ServiceError};
use crate::db::{self, TransactionRepository};
use crate::models::{NewTransaction, Transaction, TransactionChanges};

/// Signed cash movement a ledger entry accounts for.
///
/// ```
/// # use kasir_core::{TransactionStatus, TransactionType};
/// # use kasir_server::services::ledger::cash_effect;
/// # use rust_decimal::Decimal;
/// let amount = Decimal::from(12_000);
/// assert_eq!(cash_effect(TransactionType::Outcome, TransactionStatus::Completed, amount), -amount);
/// assert_eq!(cash_effect(TransactionType::Income, TransactionStatus::Pending, amount), Decimal::ZERO);
/// ```
#[must_use]
pub fn cash_effect(kind: TransactionType, status: TransactionStatus, amount: Decimal) -> Decimal {
    if status.affects_cash() {
        kind.cash_delta(amount)
    } else {
        Decimal::ZERO
    }
}

/// Effect of a stored entry.
#[must_use]
pub fn entry_effect(entry: &Transaction) -> Decimal {
    cash_effect(entry.kind, entry.status, entry.amount)
}

/// Ledger amounts must be strictly positive; direction comes from the type.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for zero or negative amounts and for
/// amounts with sub-cent digits.
pub fn validate_amount(amount: Decimal) -> Result<(), ServiceError> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "amount must be greater than zero".to_owned(),
        ));
    }
    check_scale(amount)?;
    Ok(())
}

/// Move the balance inside an open transaction.
///
/// A zero delta touches nothing.
///
/// # Errors
///
/// Returns `ServiceError::NotFound` if there is no cash row.
pub async fn apply_cash_delta(
    conn: &mut PgConnection,
    delta: Decimal,
) -> Result<Option<Decimal>, ServiceError> {
    if delta.is_zero() {
        return Ok(None);
    }
    db::cash::adjust(conn, delta)
        .await?
        .map(Some)
        .ok_or_else(|| ServiceError::NotFound(NO_CASH_ROW.to_owned()))
}

/// Ledger service.
pub struct LedgerService<'a> {
    pool: &'a PgPool,
}

impl<'a> LedgerService<'a> {
    /// Create a new ledger service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Transaction>, ServiceError> {
        Ok(TransactionRepository::new(self.pool).list().await?)
    }

    /// Record an entry, move cash by its effect and raise a notification.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a non-positive amount and
    /// `ServiceError::NotFound` if a completed entry finds no cash row.
    pub async fn create(
        &self,
        entry: &NewTransaction,
        user: UserId,
    ) -> Result<Transaction, ServiceError> {
        validate_amount(entry.amount)?;

        let mut tx = self.pool.begin().await?;

        let created = db::transactions::insert(&mut *tx, entry, Some(user)).await?;
        apply_cash_delta(&mut *tx, entry_effect(&created)).await?;
        let (title, description) = TRANSACTION_CREATED;
        db::notifications::insert(&mut *tx, title, description).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %created.id,
            amount = %created.amount,
            kind = ?created.kind,
            "Transaction recorded"
        );
        Ok(created)
    }

    /// Update an entry and move cash by the difference in effect.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the entry does not exist.
    pub async fn update(
        &self,
        id: TransactionId,
        changes: &TransactionChanges,
    ) -> Result<Transaction, ServiceError> {
        if let Some(amount) = changes.amount {
            validate_amount(amount)?;
        }

        let mut tx = self.pool.begin().await?;

        let before = db::transactions::find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transaction {id} not found")))?;
        let after = db::transactions::update(&mut *tx, id, changes).await?;
        apply_cash_delta(&mut *tx, entry_effect(&after) - entry_effect(&before)).await?;

        tx.commit().await?;
        Ok(after)
    }

    /// Delete an entry and reverse its cash effect.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the entry does not exist.
    pub async fn delete(&self, id: TransactionId) -> Result<Transaction, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let deleted = db::transactions::delete(&mut *tx, id)
            .await
            .map_err(|e| match e {
                db::RepositoryError::NotFound => {
                    ServiceError::NotFound(format!("Transaction {id} not found"))
                }
                other => other.into(),
            })?;
        apply_cash_delta(&mut *tx, -entry_effect(&deleted)).await?;

        tx.commit().await?;

        tracing::info!(transaction_id = %id, "Transaction deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_completed_entries_move_cash_by_direction() {
        let amount = dec("25000.00");
        assert_eq!(
            cash_effect(TransactionType::Income, TransactionStatus::Completed, amount),
            amount
        );
        assert_eq!(
            cash_effect(TransactionType::Outcome, TransactionStatus::Completed, amount),
            -amount
        );
    }

    #[test]
    fn test_pending_and_failed_entries_do_not_move_cash() {
        let amount = dec("25000.00");
        for status in [TransactionStatus::Pending, TransactionStatus::Failed] {
            assert!(cash_effect(TransactionType::Income, status, amount).is_zero());
            assert!(cash_effect(TransactionType::Outcome, status, amount).is_zero());
        }
    }

    #[test]
    fn test_flipping_direction_moves_twice_the_amount() {
        let amount = dec("10000");
        let before = cash_effect(TransactionType::Income, TransactionStatus::Completed, amount);
        let after = cash_effect(TransactionType::Outcome, TransactionStatus::Completed, amount);
        assert_eq!(after - before, dec("-20000"));
    }

    #[test]
    fn test_completing_a_pending_entry_applies_full_amount() {
        let amount = dec("7500");
        let before = cash_effect(TransactionType::Outcome, TransactionStatus::Pending, amount);
        let after = cash_effect(TransactionType::Outcome, TransactionStatus::Completed, amount);
        assert_eq!(after - before, -amount);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec("0.01")).is_ok());
        assert!(matches!(
            validate_amount(Decimal::ZERO),
            Err(ServiceError::Validation(_))
        ));
        assert!(validate_amount(dec("-5")).is_err());
        assert!(matches!(
            validate_amount(dec("12.345")),
            Err(ServiceError::Validation(_))
        ));
    }
}
