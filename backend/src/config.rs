//! Configuration management for the Flood Risk Gateway
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FLOOD_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::GeoPoint;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Gridded forecast provider (OpenWeatherMap)
    pub openweather: OpenWeatherConfig,

    /// Regional categorical forecast provider (BMKG)
    pub bmkg: BmkgConfig,

    /// Flood inference service
    pub inference: InferenceConfig,

    /// Forecast window and default location
    pub forecast: ForecastConfig,

    /// History store
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenWeatherConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// API key (appid)
    pub api_key: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BmkgConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Province code (adm1) whose areas are matched against
    pub region_code: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    /// Full URL of the predict endpoint
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Number of hourly steps in a unified result
    pub window_hours: usize,

    /// Point used when a request omits coordinates
    pub default_latitude: f64,
    pub default_longitude: f64,

    /// Document key of the latest status record
    pub location_key: String,

    /// Overall deadline for one unified weather request, in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Log writes, answer every query with nothing
    Log,
    /// Keep documents in process memory
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FLOOD_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8080)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("openweather.base_url", "https://api.openweathermap.org/data/2.5")?
            .set_default("openweather.api_key", "")?
            .set_default("openweather.timeout_secs", 10)?
            .set_default("bmkg.base_url", "https://api.bmkg.go.id")?
            .set_default("bmkg.region_code", "31")?
            .set_default("bmkg.timeout_secs", 10)?
            .set_default("inference.endpoint", "http://127.0.0.1:5000/predict")?
            .set_default("inference.timeout_secs", 5)?
            .set_default("forecast.window_hours", 8)?
            .set_default("forecast.default_latitude", -6.2088)?
            .set_default("forecast.default_longitude", 106.8456)?
            .set_default("forecast.location_key", "jakarta")?
            .set_default("forecast.request_timeout_secs", 15)?
            .set_default("store.backend", "log")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FLOOD_ prefix)
            .add_source(
                Environment::with_prefix("FLOOD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ForecastConfig {
    pub fn default_point(&self) -> GeoPoint {
        GeoPoint::new(self.default_latitude, self.default_longitude)
    }

    pub fn request_timeout(&self) -> Duration {
        secs(self.request_timeout_secs)
    }
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value.max(1))
}

impl OpenWeatherConfig {
    pub fn timeout(&self) -> Duration {
        secs(self.timeout_secs)
    }
}

impl BmkgConfig {
    pub fn timeout(&self) -> Duration {
        secs(self.timeout_secs)
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_hours: shared::ForecastFuser::DEFAULT_WINDOW,
            default_latitude: -6.2088,
            default_longitude: 106.8456,
            location_key: "jakarta".to_string(),
            request_timeout_secs: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = Config::load().unwrap();
        assert_eq!(config.bmkg.region_code, "31");
        assert_eq!(config.forecast.window_hours, 8);
        assert_eq!(config.store.backend, StoreBackend::Log);
        assert_eq!(config.forecast.default_point(), GeoPoint::new(-6.2088, 106.8456));
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let inference = InferenceConfig {
            endpoint: "http://localhost/predict".to_string(),
            timeout_secs: 0,
        };
        assert_eq!(inference.timeout(), Duration::from_secs(1));
    }
}
