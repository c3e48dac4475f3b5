//! Cash-on-hand repository.
//!
//! The balance lives in a single row. Every ledger write moves it with an
//! in-database increment so concurrent writers never lose an update.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use kasir_core::CashId;

use super::RepositoryError;
use crate::models::CashBalance;

/// Repository for the cash balance.
pub struct CashRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CashRepository<'a> {
    /// Create a new cash repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All cash rows (normally exactly one).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CashBalance>, RepositoryError> {
        let rows = sqlx::query_as::<_, CashBalance>(
            "SELECT id, nominal, updated_at FROM cash ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Overwrite a balance. This is the manual override used by admins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no cash row has this ID.
    pub async fn set_nominal(
        &self,
        id: CashId,
        nominal: Decimal,
    ) -> Result<CashBalance, RepositoryError> {
        sqlx::query_as::<_, CashBalance>(
            r"
            UPDATE cash SET nominal = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, nominal, updated_at
            ",
        )
        .bind(id)
        .bind(nominal)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create the cash row if none exists yet.
    ///
    /// Returns the existing row untouched when one is already present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn init(&self, nominal: Decimal) -> Result<CashBalance, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serialise concurrent initialisers.
        sqlx::query("LOCK TABLE cash IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_as::<_, CashBalance>(
            "SELECT id, nominal, updated_at FROM cash ORDER BY id LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let row = match existing {
            Some(row) => row,
            None => {
                sqlx::query_as::<_, CashBalance>(
                    "INSERT INTO cash (nominal) VALUES ($1) RETURNING id, nominal, updated_at",
                )
                .bind(nominal)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(row)
    }
}

/// Move the balance by `delta` and return the new nominal.
///
/// Returns `None` when there is no cash row to move.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn adjust(
    conn: &mut PgConnection,
    delta: Decimal,
) -> Result<Option<Decimal>, RepositoryError> {
    let nominal = sqlx::query_scalar::<_, Decimal>(
        r"
        UPDATE cash SET nominal = nominal + $1, updated_at = NOW()
        WHERE id = (SELECT id FROM cash ORDER BY id LIMIT 1)
        RETURNING nominal
        ",
    )
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(nominal)
}
