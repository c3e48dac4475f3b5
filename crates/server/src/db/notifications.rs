//! Notification inbox repository.

use sqlx::{PgConnection, PgPool};

use kasir_core::NotificationId;

use super::RepositoryError;
use crate::models::Notification;

/// Channel the insert trigger publishes new rows on.
pub const NOTIFICATION_CHANNEL: &str = "notifications_inserted";

/// Repository for inbox reads and flag updates.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Unread notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_unread(&self) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, Notification>(
            r"
            SELECT id, title, description, created_at, is_read
            FROM notifications
            WHERE is_read = FALSE
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Set the read flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no notification has this ID.
    pub async fn mark_read(&self, id: NotificationId) -> Result<Notification, RepositoryError> {
        sqlx::query_as::<_, Notification>(
            r"
            UPDATE notifications SET is_read = TRUE
            WHERE id = $1
            RETURNING id, title, description, created_at, is_read
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

/// Insert an unread notification.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert(
    conn: &mut PgConnection,
    title: &str,
    description: &str,
) -> Result<Notification, RepositoryError> {
    let row = sqlx::query_as::<_, Notification>(
        r"
        INSERT INTO notifications (title, description)
        VALUES ($1, $2)
        RETURNING id, title, description, created_at, is_read
        ",
    )
    .bind(title)
    .bind(description)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}
