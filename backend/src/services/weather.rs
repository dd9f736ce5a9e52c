//! Weather gateway: fetches both providers, fuses them, records history
//!
//! Every upstream failure is absorbed here. A failed regional fetch only
//! removes the categorical floor; a failed gridded fetch turns the whole answer
//! into the placeholder series. Each fetch is bounded by the request deadline
//! and a late one counts as a failure of that provider only.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::{
    find_nearest, is_within_indonesia, map_to_score, CurrentConditions, ForecastFuser, GeoPoint,
    RegionalArea, UnifiedWeatherResult, WeatherRecord, DEGRADED_LOCATION,
    LATEST_STATUS_COLLECTION, TIMESTAMP_FIELD, WEATHER_HISTORY_COLLECTION,
};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::openweather::{CurrentWeather, WeatherForecast};
use crate::external::{BmkgClient, OpenWeatherClient};
use crate::store::{
    append_record, get_record, query_records, upsert_record, DocumentStore, OrderBy,
};

/// Number of records returned by the history endpoint
pub const HISTORY_LIMIT: usize = 24;

const UNKNOWN_LOCATION: &str = "Unknown location";

/// Categorical signal extracted from the regional provider
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalSignal {
    /// `None` when nothing could be matched
    pub area_name: Option<String>,
    pub description: Option<String>,
    pub score: u8,
}

impl RegionalSignal {
    /// Label used in the source note
    pub fn label(&self) -> &str {
        self.area_name.as_deref().unwrap_or("Offline")
    }
}

/// Match `point` against the regional payload and score the matched area.
///
/// A failed fetch and an unmatched point both fall through to the default
/// score of an absent description.
pub fn regional_signal(point: &GeoPoint, areas: AppResult<Vec<RegionalArea>>) -> RegionalSignal {
    let areas = match areas {
        Ok(areas) => areas,
        Err(e) => {
            tracing::warn!(error = %e, "Regional forecast unavailable, continuing without it");
            Vec::new()
        }
    };

    match find_nearest(point, &areas) {
        Some(area) => {
            let description = area.current_description().map(str::to_string);
            let score = map_to_score(description.as_deref());
            if let Some(location) = &area.location {
                tracing::info!(
                    area = %area.name,
                    distance_km = %format!("{:.2}", point.approx_distance_km(location)),
                    description = description.as_deref().unwrap_or("-"),
                    score,
                    "Nearest regional area"
                );
            }
            RegionalSignal {
                area_name: Some(area.name.clone()),
                description,
                score,
            }
        }
        None => {
            if !areas.is_empty() {
                tracing::warn!(areas = areas.len(), "No regional area has usable coordinates");
            }
            RegionalSignal {
                area_name: None,
                description: None,
                score: map_to_score(None),
            }
        }
    }
}

/// Orchestrates the two weather providers
#[derive(Clone)]
pub struct WeatherGateway {
    openweather: OpenWeatherClient,
    bmkg: BmkgClient,
    store: Arc<dyn DocumentStore>,
    fuser: ForecastFuser,
    default_point: GeoPoint,
    location_key: String,
    request_timeout: Duration,
}

impl WeatherGateway {
    pub fn new(
        openweather: OpenWeatherClient,
        bmkg: BmkgClient,
        store: Arc<dyn DocumentStore>,
        config: &Config,
    ) -> Self {
        Self {
            openweather,
            bmkg,
            store,
            fuser: ForecastFuser::new(config.forecast.window_hours),
            default_point: config.forecast.default_point(),
            location_key: config.forecast.location_key.clone(),
            request_timeout: config.forecast.request_timeout(),
        }
    }

    /// Build the gateway and its upstream clients from configuration
    pub fn from_config(config: &Config, store: Arc<dyn DocumentStore>) -> AppResult<Self> {
        let openweather = OpenWeatherClient::with_base_url(
            config.openweather.api_key.clone(),
            config.openweather.base_url.clone(),
            config.openweather.timeout(),
        )?;
        let bmkg = BmkgClient::new(
            config.bmkg.base_url.clone(),
            config.bmkg.region_code.clone(),
            config.bmkg.timeout(),
        )?;
        Ok(Self::new(openweather, bmkg, store, config))
    }

    pub fn default_point(&self) -> GeoPoint {
        self.default_point
    }

    /// Unified hourly weather for a point. Never fails: upstream trouble
    /// degrades the answer instead.
    pub async fn get_unified_weather(&self, point: GeoPoint) -> UnifiedWeatherResult {
        if !is_within_indonesia(&point) {
            tracing::warn!(
                lat = point.latitude,
                lon = point.longitude,
                "Point is outside the regional provider's coverage"
            );
        }

        let (current, forecast, areas) = tokio::join!(
            self.with_deadline("openweather", self.openweather.get_current_weather(&point)),
            self.with_deadline("openweather", self.openweather.get_forecast(&point)),
            self.with_deadline("bmkg", self.bmkg.get_regional_areas()),
        );

        let regional = regional_signal(&point, areas);

        let (current, forecast) = match (current, forecast) {
            (Ok(current), Ok(forecast)) => (current, forecast),
            (current, forecast) => {
                for e in [current.err(), forecast.err()].into_iter().flatten() {
                    tracing::warn!(error = %e, "Gridded forecast unavailable");
                }
                return self.placeholder();
            }
        };

        let result = self.combine(current, forecast, &regional);

        if let Some(first) = result.hourly.first() {
            tracing::info!(
                location = %result.location,
                regional = regional.score,
                fused = first.precipitation_probability,
                "Hybrid rain probability"
            );
        }

        self.spawn_history_write(&result, point == self.default_point);
        result
    }

    /// Bound one upstream call by the request deadline. A late call fails on
    /// its own, so only its provider's degraded path is taken.
    async fn with_deadline<T>(
        &self,
        service: &str,
        fetch: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        tokio::time::timeout(self.request_timeout, fetch)
            .await
            .unwrap_or_else(|_| {
                Err(AppError::upstream(
                    service,
                    format!("no answer within {}s", self.request_timeout.as_secs()),
                ))
            })
    }

    fn combine(
        &self,
        current: CurrentWeather,
        forecast: WeatherForecast,
        regional: &RegionalSignal,
    ) -> UnifiedWeatherResult {
        let hourly = self.fuser.fuse(&forecast.entries, regional.score);

        let location = [
            Some(current.location_name),
            Some(forecast.location_name),
            regional.area_name.clone(),
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

        UnifiedWeatherResult {
            location,
            source_note: format!("Data: OW + BMKG {}", regional.label()),
            current: current.conditions,
            hourly,
        }
    }

    fn placeholder(&self) -> UnifiedWeatherResult {
        UnifiedWeatherResult::placeholder(self.fuser.placeholder_hours(Utc::now()))
    }

    /// Fire-and-forget history write; failures are logged, never returned
    fn spawn_history_write(&self, result: &UnifiedWeatherResult, update_latest: bool) {
        if result.is_degraded() {
            return;
        }

        let record = WeatherRecord::from_current(&result.current, result.location.clone(), Utc::now());
        let store = Arc::clone(&self.store);
        let key = update_latest.then(|| self.location_key.clone());

        tokio::spawn(async move {
            if let Err(e) = persist_weather_record(store.as_ref(), key.as_deref(), &record).await {
                tracing::warn!(error = %e, "Failed to persist weather history");
            }
        });
    }

    /// Latest status document; fetched and stored on first use
    pub async fn get_latest_status(&self) -> WeatherRecord {
        match get_record::<WeatherRecord>(
            self.store.as_ref(),
            LATEST_STATUS_COLLECTION,
            &self.location_key,
        )
        .await
        {
            Ok(Some(record)) => return record,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Latest status lookup failed, refreshing"),
        }

        self.refresh_latest_status().await
    }

    /// Fetch current conditions for the default point and record them
    pub async fn refresh_latest_status(&self) -> WeatherRecord {
        let current = match self.openweather.get_current_weather(&self.default_point).await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!(error = %e, "Current conditions unavailable, serving placeholder");
                return WeatherRecord::from_current(
                    &CurrentConditions::default(),
                    DEGRADED_LOCATION,
                    Utc::now(),
                );
            }
        };

        let location = if current.location_name.trim().is_empty() {
            self.location_key.clone()
        } else {
            current.location_name
        };
        let record = WeatherRecord::from_current(&current.conditions, location, Utc::now());

        let store = Arc::clone(&self.store);
        let key = self.location_key.clone();
        let to_store = record.clone();
        tokio::spawn(async move {
            if let Err(e) = persist_weather_record(store.as_ref(), Some(&key), &to_store).await {
                tracing::warn!(error = %e, "Failed to persist latest status");
            }
        });

        record
    }

    /// Most recent history records, newest first. Empty when the store fails.
    pub async fn get_history(&self) -> Vec<WeatherRecord> {
        query_records(
            self.store.as_ref(),
            WEATHER_HISTORY_COLLECTION,
            &OrderBy::desc(TIMESTAMP_FIELD),
            HISTORY_LIMIT,
        )
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Weather history unavailable");
            Vec::new()
        })
    }
}

/// Append to history and, when `latest_key` is given, replace the latest status
pub async fn persist_weather_record(
    store: &dyn DocumentStore,
    latest_key: Option<&str>,
    record: &WeatherRecord,
) -> AppResult<()> {
    append_record(store, WEATHER_HISTORY_COLLECTION, record).await?;
    if let Some(key) = latest_key {
        upsert_record(store, LATEST_STATUS_COLLECTION, key, record).await?;
    }
    Ok(())
}
