//! System summary handler

use axum::{extract::State, Json};

use crate::dto::summary::SummaryResponse;
use crate::error::ApiError;
use crate::AppState;

/// System-wide rollup across all active orders
pub async fn system_summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, ApiError> {
    Ok(Json(state.ledger.system_summary().into()))
}
