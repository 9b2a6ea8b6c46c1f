//! Configuration management for the Astral Insights backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ASTRAL_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// On-disk cache configuration
    pub cache: CacheConfig,

    /// Timezone lookup service configuration
    pub timezone_api: TimezoneApiConfig,

    /// Forecast interpretation service configuration
    pub forecast_api: ForecastApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Empty string disables the database and
    /// the service falls back to file or in-memory storage.
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Directory for the file-backed key-value store
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimezoneApiConfig {
    /// Base URL of the coordinates-to-timezone lookup service
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastApiConfig {
    /// Base URL of the forecast interpretation service
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ASTRAL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("cache.dir", "./cache")?
            .set_default("timezone_api.base_url", "https://api.wheretheiss.at/v1")?
            .set_default("forecast_api.base_url", "https://astral-interpreter.internal")?
            .set_default("forecast_api.timeout_seconds", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ASTRAL_ prefix)
            .add_source(
                Environment::with_prefix("ASTRAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
