//! Dashboard API handlers.

use axum::{Json, Router, extract::State, routing::get};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{DailyIncome, TotalByType};
use crate::services::dashboard::DashboardService;
use crate::state::AppState;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/income-outcome", get(income_outcome))
        .route("/api/dashboard/daily-income", get(daily_income))
        .route("/api/dashboard/cash-on-hand", get(super::cash::list))
}

async fn income_outcome(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<TotalByType>>> {
    let service = DashboardService::new(state.pool(), state.config().business_offset);
    Ok(Json(service.income_outcome().await?))
}

async fn daily_income(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<DailyIncome>>> {
    let service = DashboardService::new(state.pool(), state.config().business_offset);
    Ok(Json(service.daily_income().await?))
}
