//! Cash-on-hand API handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};

use kasir_core::CashId;

use super::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{CashBalance, Reconciliation};
use crate::services::cash::{CashService, CashUpdate};
use crate::state::AppState;

/// Build the cash router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cash", get(list))
        .route("/api/cash/reconciliation", get(reconciliation))
        .route("/api/cash/{id}", put(set))
}

pub(super) async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<CashBalance>>> {
    Ok(Json(CashService::new(state.pool()).list().await?))
}

/// Manual override, admins only.
async fn set(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<CashId>,
    ApiJson(body): ApiJson<CashUpdate>,
) -> Result<Json<CashBalance>> {
    tracing::info!(user_id = %admin.id, cash_id = %id, "Admin cash edit");
    Ok(Json(CashService::new(state.pool()).set(id, body).await?))
}

async fn reconciliation(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Reconciliation>> {
    Ok(Json(CashService::new(state.pool()).reconcile().await?))
}
