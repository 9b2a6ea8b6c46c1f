//! Astral Insights backend library
//!
//! Astrology data and forecast cache service: birth-data onboarding, natal
//! and transit chart management, timezone resolution, and the time-windowed
//! daily forecast cache.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod astro;
pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod storage;

pub use config::Config;

use services::{AstrologyDataManager, DailyForecastService, OnboardingService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Option<sqlx::PgPool>,
    pub manager: Arc<AstrologyDataManager>,
    pub onboarding: Arc<OnboardingService>,
    pub forecast: Arc<DailyForecastService>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Astral Insights API v1.0"
}
