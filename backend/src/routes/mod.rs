//! Route definitions for the Astral Insights backend

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Birth data onboarding
        .route(
            "/users/:user_id/birth-data",
            post(handlers::submit_birth_data).get(handlers::get_birth_data),
        )
        // Chart snapshots
        .route("/charts/natal", get(handlers::get_natal_chart))
        .route("/charts/transit", get(handlers::get_transit_chart))
        .route(
            "/users/:user_id/charts/transit",
            post(handlers::refresh_transit_chart),
        )
        .route("/charts", delete(handlers::clear_charts))
        // Daily forecast
        .route("/daily-forecast", get(handlers::get_daily_forecast))
}
