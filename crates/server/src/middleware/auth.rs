//! Authentication extractors.
//!
//! Requests authenticate with `Authorization: Bearer <access token>`. The
//! token's digest is resolved to a [`CurrentUser`] through a short-lived
//! cache in front of `auth_sessions`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService, digest_token};
use crate::state::AppState;

/// The raw bearer token of the request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .map(|token| Self(token.to_owned()))
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
    }
}

/// Pull the token out of an `Authorization` header value.
fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let digest = digest_token(&state.config().auth.token_secret, &token)?;

        let resolved = if let Some(resolved) = state.auth_cache().get(&digest).await {
            resolved
        } else {
            let resolved = AuthService::new(state.pool(), &state.config().auth)
                .authenticate_digest(&digest)
                .await
                .map_err(|e| match e {
                    AuthError::InvalidToken => invalid_token(),
                    other => other.into(),
                })?;
            state.auth_cache().insert(digest.clone(), resolved.clone()).await;
            resolved
        };

        // A cached entry can outlive the token it resolved.
        if !resolved.is_live_at(Utc::now()) {
            state.auth_cache().invalidate(&digest).await;
            return Err(invalid_token());
        }

        let user = resolved.user;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

fn invalid_token() -> AppError {
    AppError::Unauthorized("Invalid or expired token".to_string())
}

/// Extractor that requires an authenticated admin.
///
/// Returns 401 when no valid token is presented and 403 when the caller is
/// not an admin.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin role required".to_string()));
        }
        Ok(Self(user))
    }
}
