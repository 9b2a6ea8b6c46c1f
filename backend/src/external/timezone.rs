//! Coordinates-to-timezone lookup client
//!
//! Resolves GPS coordinates to an IANA timezone identifier via a remote
//! lookup service. Callers fall back to a local estimate when the lookup
//! fails, so every error here is recoverable.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Result of a coordinates-to-timezone lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneLookup {
    /// IANA identifier, e.g. "Europe/Paris".
    pub timezone_id: String,
}

/// Remote timezone resolution for a pair of coordinates.
#[async_trait]
pub trait TimezoneApi: Send + Sync {
    async fn lookup(&self, latitude: f64, longitude: f64) -> AppResult<TimezoneLookup>;
}

/// Timezone lookup API response
#[derive(Debug, Deserialize)]
struct LookupResponse {
    timezone_id: String,
}

/// HTTP client for the timezone lookup service
#[derive(Clone)]
pub struct HttpTimezoneClient {
    client: Client,
    base_url: String,
}

impl HttpTimezoneClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl TimezoneApi for HttpTimezoneClient {
    async fn lookup(&self, latitude: f64, longitude: f64) -> AppResult<TimezoneLookup> {
        let url = format!("{}/coordinates/{},{}", self.base_url, latitude, longitude);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout
            } else {
                AppError::ExternalService(format!("Timezone lookup request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(AppError::Http {
                status: response.status().as_u16(),
            });
        }

        let data: LookupResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse timezone response: {}", e))
        })?;

        Ok(TimezoneLookup {
            timezone_id: data.timezone_id,
        })
    }
}
