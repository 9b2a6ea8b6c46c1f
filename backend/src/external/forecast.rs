//! Forecast interpretation service client
//!
//! Sends a transit chart to the interpretation service and receives a prose
//! daily forecast. Failures are surfaced to the caller and never cached.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::models::ChartSnapshot;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Response from the forecast interpretation service.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastApiResponse {
    /// Prose forecast text.
    pub forecast: String,

    /// Generation timestamp as reported by the service; absent on some
    /// deployments, in which case callers stamp their own.
    pub timestamp: Option<String>,
}

/// Daily forecast generation from a transit chart.
#[async_trait]
pub trait ForecastApi: Send + Sync {
    async fn generate(&self, transit_chart: &ChartSnapshot) -> AppResult<ForecastApiResponse>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastRequest<'a> {
    transit_chart: &'a ChartSnapshot,
}

/// HTTP client for the forecast interpretation service
#[derive(Clone)]
pub struct HttpForecastClient {
    client: Client,
    base_url: String,
}

impl HttpForecastClient {
    pub fn new(base_url: String, timeout_seconds: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::Configuration(format!("Failed to build forecast HTTP client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ForecastApi for HttpForecastClient {
    async fn generate(&self, transit_chart: &ChartSnapshot) -> AppResult<ForecastApiResponse> {
        let url = format!("{}/daily-forecast", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ForecastRequest { transit_chart })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout
                } else {
                    AppError::ExternalService(format!("Forecast request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(AppError::Http {
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse forecast response: {}", e))
        })
    }
}
