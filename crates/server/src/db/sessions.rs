//! Bearer-token session repository.
//!
//! Only HMAC digests of tokens reach the database; lookups hash the
//! presented token first.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kasir_core::{SessionId, UserId};

use super::{RepositoryError, map_write_error};

/// A stored session row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// A session after a refresh, with the access digest it replaced.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RotatedSession {
    #[sqlx(flatten)]
    pub session: StoredSession,
    pub previous_access_hash: String,
}

/// Digests and expiries for a freshly issued token pair.
#[derive(Debug, Clone)]
pub struct IssuedTokens<'t> {
    pub access_token_hash: &'t str,
    pub refresh_token_hash: &'t str,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Repository for auth sessions.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new session for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a digest collision.
    pub async fn create(
        &self,
        user_id: UserId,
        tokens: &IssuedTokens<'_>,
    ) -> Result<StoredSession, RepositoryError> {
        sqlx::query_as::<_, StoredSession>(
            r"
            INSERT INTO auth_sessions
                (user_id, access_token_hash, refresh_token_hash, access_expires_at, refresh_expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, access_expires_at, refresh_expires_at
            ",
        )
        .bind(user_id)
        .bind(tokens.access_token_hash)
        .bind(tokens.refresh_token_hash)
        .bind(tokens.access_expires_at)
        .bind(tokens.refresh_expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "token collision"))
    }

    /// Find the session owning an access token digest, if it has not expired.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_access_hash(
        &self,
        access_token_hash: &str,
    ) -> Result<Option<StoredSession>, RepositoryError> {
        let row = sqlx::query_as::<_, StoredSession>(
            r"
            SELECT id, user_id, access_expires_at, refresh_expires_at
            FROM auth_sessions
            WHERE access_token_hash = $1 AND access_expires_at > NOW()
            ",
        )
        .bind(access_token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Swap a live refresh token for a new token pair.
    ///
    /// The old digests stop matching as soon as this commits. Returns `None`
    /// if the refresh token is unknown or expired.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn rotate(
        &self,
        refresh_token_hash: &str,
        tokens: &IssuedTokens<'_>,
    ) -> Result<Option<RotatedSession>, RepositoryError> {
        let row = sqlx::query_as::<_, RotatedSession>(
            r"
            WITH old AS (
                SELECT id, access_token_hash
                FROM auth_sessions
                WHERE refresh_token_hash = $1 AND refresh_expires_at > NOW()
                FOR UPDATE
            )
            UPDATE auth_sessions s SET
                access_token_hash  = $2,
                refresh_token_hash = $3,
                access_expires_at  = $4,
                refresh_expires_at = $5
            FROM old
            WHERE s.id = old.id
            RETURNING s.id, s.user_id, s.access_expires_at, s.refresh_expires_at,
                      old.access_token_hash AS previous_access_hash
            ",
        )
        .bind(refresh_token_hash)
        .bind(tokens.access_token_hash)
        .bind(tokens.refresh_token_hash)
        .bind(tokens.access_expires_at)
        .bind(tokens.refresh_expires_at)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "token collision"))?;

        Ok(row)
    }

    /// Delete the session owning an access token digest.
    ///
    /// Returns `true` if a session was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_by_access_hash(
        &self,
        access_token_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE access_token_hash = $1")
            .bind(access_token_hash)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove sessions whose refresh token has expired.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE refresh_expires_at <= NOW()")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
