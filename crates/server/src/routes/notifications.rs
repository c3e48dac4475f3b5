//! Notification API handlers and the realtime SSE feed.

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use kasir_core::NotificationId;

use super::ApiPath;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Notification;
use crate::services::notifications::NotificationService;
use crate::state::AppState;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list_unread))
        .route("/api/notifications/test", post(send_test))
        .route("/api/notifications/stream", get(stream))
        .route("/api/notifications/{id}/read", post(mark_read))
}

async fn list_unread(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<Notification>>> {
    Ok(Json(NotificationService::new(state.pool()).list_unread().await?))
}

async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<Json<Notification>> {
    Ok(Json(NotificationService::new(state.pool()).mark_read(id).await?))
}

async fn send_test(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<Notification>)> {
    let notification = NotificationService::new(state.pool()).send_test().await?;
    tracing::info!(user_id = %user.id, notification_id = %notification.id, "Test notification sent");
    Ok((StatusCode::CREATED, Json(notification)))
}

fn json_event<T: Serialize>(name: &'static str, value: &T) -> Event {
    let json = serde_json::to_string(value).unwrap_or_else(|_| {
        r#"{"error":"Failed to serialize event"}"#.to_string()
    });
    Event::default().event(name).data(json)
}

/// GET /api/notifications/stream
///
/// Sends the current unread list as an `unread` event, then one
/// `notification` event per insert for as long as the client stays connected.
async fn stream(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    // Subscribe before the snapshot so inserts in between are not missed.
    let mut rx = state.notifications().subscribe();
    let unread = NotificationService::new(state.pool()).list_unread().await?;

    tracing::debug!(user_id = %user.id, unread = unread.len(), "Notification stream opened");

    let events = async_stream::stream! {
        yield Ok(json_event("unread", &unread));

        loop {
            match rx.recv().await {
                Ok(notification) => yield Ok(json_event("notification", &notification)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notification stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_event_renders_name_and_payload() {
        let notification = crate::services::notifications::parse_payload(
            r#"{"id":"0b8f1e3c-5d2a-4c7e-9f61-3a2b4c5d6e7f","title":"Order",
                "description":"Order created successfully",
                "created_at":"2026-03-01T10:15:30+00:00","is_read":false}"#,
        )
        .unwrap();

        let events = futures::stream::iter(vec![Ok::<_, Infallible>(json_event(
            "notification",
            &notification,
        ))]);
        let response = axum::response::IntoResponse::into_response(Sse::new(events));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(text.starts_with("event: notification\n"));
        assert!(text.contains("\"title\":\"Order\""));
    }
}
