//! Ledger API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};

use kasir_core::TransactionId;

use super::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{NewTransaction, Transaction, TransactionChanges};
use crate::services::ledger::LedgerService;
use crate::state::AppState;

/// Build the transactions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/transactions", get(list).post(create))
        .route("/api/transactions/{id}", put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<Transaction>>> {
    Ok(Json(LedgerService::new(state.pool()).list().await?))
}

async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let created = LedgerService::new(state.pool()).create(&body, user.id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(id): ApiPath<TransactionId>,
    ApiJson(body): ApiJson<TransactionChanges>,
) -> Result<Json<Transaction>> {
    Ok(Json(LedgerService::new(state.pool()).update(id, &body).await?))
}

async fn remove(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(id): ApiPath<TransactionId>,
) -> Result<StatusCode> {
    LedgerService::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
