//! Auth API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use kasir_core::AuthSession;

use super::ApiJson;
use crate::error::{Result, clear_sentry_user};
use crate::middleware::{BearerToken, RequireAuth, auth_rate_limiter};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthService, digest_token};
use crate::state::AppState;

/// Build the auth router.
pub fn router(trust_proxy: bool) -> Router<AppState> {
    let rate_limited = Router::new()
        .route("/api/auth/login", post(login))
        .layer(auth_rate_limiter(trust_proxy));

    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .merge(rate_limited)
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Create a cashier account.
async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool(), &state.config().auth)
        .signup(&body.email, &body.password, body.name.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "User signed up");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for a token pair.
async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthSession>> {
    let session = AuthService::new(state.pool(), &state.config().auth)
        .login(&body.email, &body.password)
        .await?;

    Ok(Json(session))
}

/// Rotate a token pair.
async fn refresh(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<Json<AuthSession>> {
    let refreshed = AuthService::new(state.pool(), &state.config().auth)
        .refresh(&body.refresh_token)
        .await?;
    state
        .auth_cache()
        .invalidate(&refreshed.retired_access_hash)
        .await;

    Ok(Json(refreshed.session))
}

/// Close the session of the presented token.
async fn logout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    BearerToken(token): BearerToken,
) -> Result<StatusCode> {
    let auth = &state.config().auth;
    AuthService::new(state.pool(), auth).logout(&token).await?;
    state
        .auth_cache()
        .invalidate(&digest_token(&auth.token_secret, &token)?)
        .await;

    clear_sentry_user();
    tracing::info!(user_id = %user.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// The authenticated caller.
async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
