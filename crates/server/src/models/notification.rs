//! Inbox notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kasir_core::NotificationId;

/// An inbox row.
///
/// Also deserialized from the `row_to_json` payload the insert trigger
/// publishes, so field names follow the column names exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}
