//! Notification inbox and the realtime feed.
//!
//! Inserts fire `pg_notify` from a table trigger. One [`spawn_listener`]
//! task per process receives those payloads and republishes them on a
//! [`NotificationHub`] broadcast channel that SSE subscribers read from.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::ServiceError;
use crate::db::notifications::{self, NOTIFICATION_CHANNEL};
use crate::db::NotificationRepository;
use crate::models::Notification;

/// Raised after a ledger entry is recorded.
pub const TRANSACTION_CREATED: (&str, &str) = ("Transaction", "Transaction created successfully");

/// Raised after a checkout completes.
pub const ORDER_CREATED: (&str, &str) = ("Order", "Order created successfully");

/// The fixed developer test notification.
pub const TEST_NOTIFICATION: (&str, &str) = (
    "Test Notification",
    "Pesan ini dikirim oleh developer, abaikan saja",
);

/// Events buffered per subscriber before the slowest one starts lagging.
const HUB_CAPACITY: usize = 256;

/// Wait between listener reconnect attempts.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Fan-out of newly inserted notifications to live subscribers.
#[derive(Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<Notification>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    /// Receive every notification published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers. Returns how many received it.
    pub fn publish(&self, notification: Notification) -> usize {
        // No subscribers is not an error.
        self.sender.send(notification).unwrap_or(0)
    }
}

/// Parse a trigger payload.
///
/// # Errors
///
/// Returns the JSON error if the payload does not describe a notification row.
pub fn parse_payload(payload: &str) -> Result<Notification, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Start the background task that feeds `hub` from `pg_notify`.
///
/// The task reconnects after [`RECONNECT_BACKOFF`] whenever the listener
/// connection fails, and runs until aborted.
#[must_use]
pub fn spawn_listener(pool: PgPool, hub: NotificationHub) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = listen(&pool, &hub).await {
                tracing::warn!(error = %e, "Notification listener disconnected, retrying");
            }
            tokio::time::sleep(RECONNECT_BACKOFF).await;
        }
    })
}

async fn listen(pool: &PgPool, hub: &NotificationHub) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(NOTIFICATION_CHANNEL).await?;
    tracing::info!(channel = NOTIFICATION_CHANNEL, "Listening for notifications");

    loop {
        let message = listener.recv().await?;
        match parse_payload(message.payload()) {
            Ok(notification) => {
                let receivers = hub.publish(notification);
                tracing::debug!(receivers, "Notification published");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed notification payload");
            }
        }
    }
}

/// Notification service.
pub struct NotificationService<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationService<'a> {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Unread notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn list_unread(&self) -> Result<Vec<Notification>, ServiceError> {
        Ok(NotificationRepository::new(self.pool).list_unread().await?)
    }

    /// Mark one notification as read.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` with `NotFound` if it does not exist.
    pub async fn mark_read(
        &self,
        id: kasir_core::NotificationId,
    ) -> Result<Notification, ServiceError> {
        Ok(NotificationRepository::new(self.pool).mark_read(id).await?)
    }

    /// Insert the developer test notification.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the insert fails.
    pub async fn send_test(&self) -> Result<Notification, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let (title, description) = TEST_NOTIFICATION;
        Ok(notifications::insert(&mut *conn, title, description).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TRIGGER_PAYLOAD: &str = r#"{
        "id": "0b8f1e3c-5d2a-4c7e-9f61-3a2b4c5d6e7f",
        "title": "Order",
        "description": "Order created successfully",
        "created_at": "2026-03-01T10:15:30.123456+00:00",
        "is_read": false
    }"#;

    #[test]
    fn test_parse_trigger_payload() {
        let notification = parse_payload(TRIGGER_PAYLOAD).unwrap();
        assert_eq!(notification.title, "Order");
        assert_eq!(
            notification.description.as_deref(),
            Some("Order created successfully")
        );
        assert!(!notification.is_read);
    }

    #[test]
    fn test_parse_payload_with_null_description() {
        let payload = TRIGGER_PAYLOAD.replace(
            r#""Order created successfully""#,
            "null",
        );
        let notification = parse_payload(&payload).unwrap();
        assert!(notification.description.is_none());
    }

    #[test]
    fn test_parse_payload_rejects_garbage() {
        assert!(parse_payload("not json").is_err());
        assert!(parse_payload(r#"{"title": "missing fields"}"#).is_err());
    }

    #[tokio::test]
    async fn test_hub_delivers_in_order() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();

        let first = parse_payload(TRIGGER_PAYLOAD).unwrap();
        let mut second = first.clone();
        second.title = "Transaction".to_owned();

        assert_eq!(hub.publish(first.clone()), 1);
        assert_eq!(hub.publish(second.clone()), 1);

        assert_eq!(rx.recv().await.unwrap(), first);
        assert_eq!(rx.recv().await.unwrap(), second);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = NotificationHub::new();
        assert_eq!(hub.publish(parse_payload(TRIGGER_PAYLOAD).unwrap()), 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_ahead() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();
        let base = parse_payload(TRIGGER_PAYLOAD).unwrap();

        for i in 0..=HUB_CAPACITY {
            let mut n = base.clone();
            n.title = format!("n{i}");
            hub.publish(n);
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().title, "n1");
    }
}
