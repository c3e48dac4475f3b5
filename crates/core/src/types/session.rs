//! Auth session tokens as handed to clients.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Tokens issued by a successful login or refresh.
///
/// `expires_at` is the access token expiry in Unix epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}

impl AuthSession {
    /// Whether the session can authenticate a request at `now` (epoch seconds).
    ///
    /// Valid iff an access token is present and non-empty and the expiry is
    /// present and strictly after `now`. A session without an expiry is
    /// treated as invalid.
    #[must_use]
    pub fn is_valid_at(&self, now: i64) -> bool {
        let has_token = self
            .access_token
            .as_deref()
            .is_some_and(|token| !token.is_empty());

        has_token && self.expires_at.is_some_and(|expires_at| expires_at > now)
    }

    /// [`Self::is_valid_at`] against the current wall clock.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp())
    }
}
