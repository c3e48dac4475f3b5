//! Ledger entry repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use kasir_core::{TransactionCategory, TransactionId, TransactionStatus, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{NewTransaction, Transaction, TransactionChanges};

const TRANSACTION_COLUMNS: &str = "id, amount, user_uid, status, category, type, description, \
     order_id, payment_method_id, created_at";

/// Read access to the ledger.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a ledger entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// `(created_at, amount)` of every income entry, for the daily report.
    ///
    /// Pending and failed entries count too, matching the income/outcome
    /// totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn income_entries(
        &self,
    ) -> Result<Vec<(DateTime<Utc>, Decimal)>, RepositoryError> {
        let rows = sqlx::query_as(
            "SELECT created_at, amount FROM transactions WHERE type = 'income' ORDER BY created_at",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Sum of amounts per direction over the whole ledger.
    ///
    /// Returns `(income, outcome)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals_by_type(
        &self,
    ) -> Result<(Decimal, Decimal), RepositoryError> {
        let totals = sqlx::query_as(
            r"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE type = 'income'), 0),
                COALESCE(SUM(amount) FILTER (WHERE type = 'outcome'), 0)
            FROM transactions
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }

    /// Net cash the completed ledger accounts for.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn completed_net(&self) -> Result<Decimal, RepositoryError> {
        let (net,) = sqlx::query_as::<_, (Decimal,)>(
            r"
            SELECT COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE -amount END), 0)
            FROM transactions
            WHERE status = 'completed'
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(net)
    }
}

/// Insert a ledger entry for `user`.
///
/// Missing category and status are filled from the entry's type and the
/// completed default.
///
/// # Errors
///
/// Returns `RepositoryError::InvalidReference` if the order does not exist,
/// `RepositoryError::CheckViolation` for a non-positive amount.
pub async fn insert(
    conn: &mut PgConnection,
    entry: &NewTransaction,
    user: Option<UserId>,
) -> Result<Transaction, RepositoryError> {
    let category: TransactionCategory = entry
        .category
        .unwrap_or_else(|| entry.kind.default_category());
    let status: TransactionStatus = entry.status.unwrap_or_default();

    sqlx::query_as::<_, Transaction>(&format!(
        r"
        INSERT INTO transactions
            (amount, user_uid, status, category, type, description, order_id, payment_method_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {TRANSACTION_COLUMNS}
        "
    ))
    .bind(entry.amount)
    .bind(user)
    .bind(status)
    .bind(category)
    .bind(entry.kind)
    .bind(entry.description.as_deref())
    .bind(entry.order_id)
    .bind(entry.payment_method_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "transaction already exists"))
}

/// Load an entry and lock its row until the surrounding transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_for_update(
    conn: &mut PgConnection,
    id: TransactionId,
) -> Result<Option<Transaction>, RepositoryError> {
    let row = sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no entry has this ID.
pub async fn update(
    conn: &mut PgConnection,
    id: TransactionId,
    changes: &TransactionChanges,
) -> Result<Transaction, RepositoryError> {
    sqlx::query_as::<_, Transaction>(&format!(
        r"
        UPDATE transactions SET
            amount            = COALESCE($2, amount),
            type              = COALESCE($3, type),
            category          = COALESCE($4, category),
            status            = COALESCE($5, status),
            description       = COALESCE($6, description),
            payment_method_id = COALESCE($7, payment_method_id)
        WHERE id = $1
        RETURNING {TRANSACTION_COLUMNS}
        "
    ))
    .bind(id)
    .bind(changes.amount)
    .bind(changes.kind)
    .bind(changes.category)
    .bind(changes.status)
    .bind(changes.description.as_deref())
    .bind(changes.payment_method_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "transaction already exists"))?
    .ok_or(RepositoryError::NotFound)
}

/// Delete the entry with this ID and return it.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no entry has this ID.
pub async fn delete(
    conn: &mut PgConnection,
    id: TransactionId,
) -> Result<Transaction, RepositoryError> {
    sqlx::query_as::<_, Transaction>(&format!(
        "DELETE FROM transactions WHERE id = $1 RETURNING {TRANSACTION_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::NotFound)
}
