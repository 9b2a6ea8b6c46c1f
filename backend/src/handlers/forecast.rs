//! Daily forecast handlers

use axum::{extract::State, Json};
use shared::models::DailyForecast;

use crate::error::AppResult;
use crate::AppState;

/// Get the daily forecast, served from the cache when fresh
pub async fn get_daily_forecast(State(state): State<AppState>) -> AppResult<Json<DailyForecast>> {
    let forecast = state.forecast.get_daily_forecast().await?;
    Ok(Json(forecast))
}
