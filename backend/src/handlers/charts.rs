//! Chart snapshot handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::ChartSnapshot;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Get the current natal chart
pub async fn get_natal_chart(State(state): State<AppState>) -> AppResult<Json<ChartSnapshot>> {
    state
        .manager
        .natal_chart()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Natal chart".to_string()))
}

/// Get the current transit chart
pub async fn get_transit_chart(State(state): State<AppState>) -> AppResult<Json<ChartSnapshot>> {
    state
        .manager
        .transit_chart()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Transit chart".to_string()))
}

/// Regenerate the transit chart for the current instant at the user's
/// stored birth location
pub async fn refresh_transit_chart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ChartSnapshot>> {
    let snapshot = state.onboarding.refresh_transit_chart(user_id).await?;
    Ok(Json(snapshot))
}

/// Clear all session chart data (sign-out)
pub async fn clear_charts(State(state): State<AppState>) -> StatusCode {
    state.manager.clear();
    StatusCode::NO_CONTENT
}
