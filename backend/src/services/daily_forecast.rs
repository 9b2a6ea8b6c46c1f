//! Daily forecast cache
//!
//! Two states: Fresh (serve the cached entry, no network) and Stale/Empty
//! (compute a world transit chart, call the interpretation service, then
//! overwrite the cache). Failed refreshes never touch the stored entry.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use shared::models::{DailyForecast, DailyForecastCacheEntry};

use crate::astro::ChartEngine;
use crate::error::{AppError, AppResult};
use crate::external::ForecastApi;
use crate::storage::KvStore;

/// The single cache slot. Not partitioned per user: the cached forecast is
/// derived from a location-agnostic chart at (0, 0) and is valid for anyone.
pub const FORECAST_CACHE_KEY: &str = "astral.daily_forecast.v1";

/// Coordinates of the universal "world" transit chart.
const WORLD_COORDS: (f64, f64) = (0.0, 0.0);

pub struct DailyForecastService {
    engine: Arc<dyn ChartEngine>,
    api: Arc<dyn ForecastApi>,
    store: Arc<dyn KvStore>,
}

impl DailyForecastService {
    pub fn new(
        engine: Arc<dyn ChartEngine>,
        api: Arc<dyn ForecastApi>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        Self { engine, api, store }
    }

    /// Today's forecast, from the cache when fresh.
    pub async fn get_daily_forecast(&self) -> AppResult<DailyForecast> {
        self.get_daily_forecast_at(Utc::now()).await
    }

    /// Freshness and timestamps are evaluated against the supplied instant.
    pub async fn get_daily_forecast_at(&self, now: DateTime<Utc>) -> AppResult<DailyForecast> {
        let now_ms = now.timestamp_millis();

        if let Some(raw) = self.store.get(FORECAST_CACHE_KEY).await? {
            match serde_json::from_str::<DailyForecastCacheEntry>(&raw) {
                Ok(entry) if entry.is_fresh_at(now_ms) => {
                    tracing::debug!("Serving daily forecast from cache");
                    return Ok(DailyForecast {
                        forecast: entry.forecast,
                        timestamp: entry.timestamp,
                        from_cache: true,
                        transit_chart: None,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Discarding unreadable forecast cache entry: {}", e);
                }
            }
        }

        let chart = self
            .engine
            .compute_chart(now, WORLD_COORDS.0, WORLD_COORDS.1)?;

        // Any failure from here up to the cache write propagates without
        // touching the stored entry.
        let response = self.api.generate(&chart).await?;

        let timestamp = response
            .timestamp
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Secs, true));

        let entry = DailyForecastCacheEntry {
            forecast: response.forecast.clone(),
            timestamp: timestamp.clone(),
            saved_at_epoch_ms: now_ms,
        };
        let serialized = serde_json::to_string(&entry)
            .map_err(|e| AppError::Internal(format!("Failed to serialize cache entry: {}", e)))?;

        if let Err(e) = self.store.set(FORECAST_CACHE_KEY, &serialized).await {
            // Best-effort cache; the fetched forecast is still good.
            tracing::warn!("Failed to persist forecast cache entry: {}", e);
        }

        Ok(DailyForecast {
            forecast: response.forecast,
            timestamp,
            from_cache: false,
            transit_chart: Some(chart),
        })
    }
}
