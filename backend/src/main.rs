//! Astral Insights - Backend Server
//!
//! Astrology data and forecast cache service: onboarding, natal and transit
//! chart management, and the time-windowed daily forecast cache.

use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use astral_backend::astro::MeanElementsEngine;
use astral_backend::external::{HttpForecastClient, HttpTimezoneClient};
use astral_backend::services::{
    AstrologyDataManager, DailyForecastService, OnboardingService, TimezoneResolver,
};
use astral_backend::storage::{
    select_kv_store, KvStore, MemoryProfileStore, PgProfileStore, ProfileStore,
};
use astral_backend::{create_app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "astral_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Astral Insights Server");
    tracing::info!("Environment: {}", config.environment);

    // Database is optional; without it the service runs on file or
    // in-memory storage.
    let db_pool = if config.database.is_enabled() {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database.url)
            .await?;
        tracing::info!("Database connection established");

        if config.environment == "development" {
            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations completed");
        }

        Some(pool)
    } else {
        tracing::info!("Database disabled by configuration");
        None
    };

    // Wire up collaborators
    let engine = Arc::new(MeanElementsEngine::new());
    let manager = Arc::new(AstrologyDataManager::new(engine.clone()));

    let resolver = TimezoneResolver::new(Arc::new(HttpTimezoneClient::new(
        config.timezone_api.base_url.clone(),
    )));

    let profiles: Arc<dyn ProfileStore> = match &db_pool {
        Some(pool) => Arc::new(PgProfileStore::new(pool.clone())),
        None => Arc::new(MemoryProfileStore::new()),
    };

    let onboarding = Arc::new(OnboardingService::new(
        resolver,
        engine.clone(),
        manager.clone(),
        profiles,
    ));

    let kv_store = select_kv_store(db_pool.clone(), Path::new(&config.cache.dir)).await;
    tracing::info!("Forecast cache backend: {}", kv_store.backend_name());
    let forecast_client = HttpForecastClient::new(
        config.forecast_api.base_url.clone(),
        config.forecast_api.timeout_seconds,
    )?;
    let forecast = Arc::new(DailyForecastService::new(
        engine,
        Arc::new(forecast_client),
        kv_store,
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        db: db_pool,
        manager,
        onboarding,
        forecast,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
