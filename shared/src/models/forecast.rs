//! Daily forecast types and the cache entry wire format.

use serde::{Deserialize, Serialize};

use super::chart::ChartSnapshot;

/// How long a cached forecast stays fresh (3 hours).
pub const FORECAST_CACHE_EXPIRY_MS: i64 = 3 * 60 * 60 * 1000;

/// Persisted cache entry for the daily forecast.
///
/// `saved_at_epoch_ms` is stamped by this service at write time and is the
/// only field consulted for freshness. `timestamp` is whatever the upstream
/// interpretation service reported and is echoed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastCacheEntry {
    pub forecast: String,

    pub timestamp: String,

    #[serde(rename = "savedAt")]
    pub saved_at_epoch_ms: i64,
}

impl DailyForecastCacheEntry {
    /// Whether this entry is still fresh at the given instant (epoch ms).
    pub fn is_fresh_at(&self, now_epoch_ms: i64) -> bool {
        now_epoch_ms - self.saved_at_epoch_ms < FORECAST_CACHE_EXPIRY_MS
    }
}

/// A daily forecast as returned to callers, cached or freshly generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub forecast: String,

    pub timestamp: String,

    /// True when served from the cache without contacting upstream.
    pub from_cache: bool,

    /// Transit chart the forecast was generated from; absent on cache hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit_chart: Option<ChartSnapshot>,
}
