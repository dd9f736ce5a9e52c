//! Gridded forecast client
//!
//! Integrates with the OpenWeatherMap API for current conditions and the
//! 3-hourly forecast. Only the fields the fusion pipeline consumes are
//! deserialized; everything else in the payload is ignored.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::{CurrentConditions, GeoPoint, GriddedForecastEntry};

use crate::error::{AppError, AppResult};

const SERVICE: &str = "openweather";

/// OpenWeatherMap API client
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Current conditions at a point, with the provider's place name
#[derive(Debug, Clone)]
pub struct CurrentWeather {
    pub location_name: String,
    pub conditions: CurrentConditions,
}

/// Forecast steps in chronological order
#[derive(Debug, Clone)]
pub struct WeatherForecast {
    pub location_name: String,
    pub entries: Vec<GriddedForecastEntry>,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    main: OWMMain,
    wind: Option<OWMWind>,
    rain: Option<OWMRain>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OWMWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    city: Option<OWMCity>,
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMCity {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    wind: Option<OWMWind>,
    #[serde(default)]
    pop: f64,
    rain: Option<OWMRain>,
}

impl OpenWeatherClient {
    /// Create a new OpenWeatherClient
    pub fn new(api_key: String, timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(
            api_key,
            "https://api.openweathermap.org/data/2.5".to_string(),
            timeout,
        )
    }

    /// Create a new OpenWeatherClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("OpenWeather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current weather conditions by coordinates
    pub async fn get_current_weather(&self, point: &GeoPoint) -> AppResult<CurrentWeather> {
        let data: OWMCurrentResponse = self.get_json("weather", point).await?;
        Ok(convert_current_response(data))
    }

    /// Fetch the 3-hourly forecast by coordinates
    pub async fn get_forecast(&self, point: &GeoPoint) -> AppResult<WeatherForecast> {
        let data: OWMForecastResponse = self.get_json("forecast", point).await?;
        if data.list.is_empty() {
            return Err(AppError::malformed(SERVICE, "forecast list is empty"));
        }
        Ok(convert_forecast_response(data))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, point: &GeoPoint) -> AppResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::upstream(SERVICE, format!("{} request timed out", endpoint))
                } else {
                    AppError::upstream(SERVICE, format!("{} request failed: {}", endpoint, e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                SERVICE,
                format!("{} returned {} - {}", endpoint, status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::malformed(SERVICE, format!("failed to parse {}: {}", endpoint, e)))
    }
}

fn rain_one_hour(rain: &Option<OWMRain>) -> Option<f64> {
    rain.as_ref().and_then(|r| r.one_hour)
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse) -> CurrentWeather {
    CurrentWeather {
        location_name: data.name,
        conditions: CurrentConditions {
            temperature: data.main.temp,
            humidity: data.main.humidity,
            pressure: data.main.pressure,
            wind_speed: data.wind.map(|w| w.speed).unwrap_or(0.0),
            rain: rain_one_hour(&data.rain).unwrap_or(0.0),
        },
    }
}

/// Convert OpenWeatherMap forecast response to our format
fn convert_forecast_response(data: OWMForecastResponse) -> WeatherForecast {
    let entries = data
        .list
        .into_iter()
        .map(|item| GriddedForecastEntry {
            timestamp: item.dt,
            temperature: item.main.temp,
            humidity: item.main.humidity,
            wind_speed: item.wind.map(|w| w.speed).unwrap_or(0.0),
            pop: item.pop,
            rain_1h_mm: rain_one_hour(&item.rain),
            rain_3h_mm: item.rain.as_ref().and_then(|r| r.three_hour),
        })
        .collect();

    WeatherForecast {
        location_name: data.city.map(|c| c.name).unwrap_or_default(),
        entries,
    }
}
