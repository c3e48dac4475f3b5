//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::auth::ResolvedToken;
use crate::services::notifications::NotificationHub;

/// How long a resolved access token is trusted without a database lookup.
const AUTH_CACHE_TTL: Duration = Duration::from_secs(30);
const AUTH_CACHE_CAPACITY: u64 = 10_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    notifications: NotificationHub,
    /// Access token digest -> caller and token expiry.
    auth_cache: Cache<String, ResolvedToken>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool, notifications: NotificationHub) -> Self {
        let auth_cache = Cache::builder()
            .max_capacity(AUTH_CACHE_CAPACITY)
            .time_to_live(AUTH_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                notifications,
                auth_cache,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the realtime notification fan-out.
    #[must_use]
    pub fn notifications(&self) -> &NotificationHub {
        &self.inner.notifications
    }

    /// Get the resolved-token cache.
    #[must_use]
    pub fn auth_cache(&self) -> &Cache<String, ResolvedToken> {
        &self.inner.auth_cache
    }
}
