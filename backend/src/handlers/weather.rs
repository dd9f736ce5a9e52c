//! HTTP handlers for weather endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{validate_coordinates, DataEnvelope, GeoPoint, UnifiedWeatherResult, WeatherRecord};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query parameters for the unified weather endpoint.
///
/// Kept as strings so a malformed number yields a validation error rather
/// than the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl LocationQuery {
    /// Resolve the requested point, filling missing coordinates from `default`
    pub fn resolve(&self, default: GeoPoint) -> AppResult<GeoPoint> {
        let latitude = parse_coordinate("lat", self.lat.as_deref())?.unwrap_or(default.latitude);
        let longitude = parse_coordinate("lon", self.lon.as_deref())?.unwrap_or(default.longitude);

        let point = GeoPoint::new(latitude, longitude);
        validate_coordinates(&point).map_err(|e| AppError::validation("coordinates", e))?;
        Ok(point)
    }
}

fn parse_coordinate(field: &str, raw: Option<&str>) -> AppResult<Option<f64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| AppError::validation(field, format!("not a number: {}", value))),
    }
}

/// Unified hourly weather for a point
pub async fn get_unified_weather(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<DataEnvelope<UnifiedWeatherResult>>> {
    let point = query.resolve(state.weather.default_point())?;
    let result = state.weather.get_unified_weather(point).await;
    Ok(Json(DataEnvelope::new(result)))
}

/// Latest recorded conditions for the configured location
pub async fn get_current_status(State(state): State<AppState>) -> Json<WeatherRecord> {
    Json(state.weather.get_latest_status().await)
}

/// Most recent weather history, newest first
pub async fn get_weather_history(State(state): State<AppState>) -> Json<Vec<WeatherRecord>> {
    Json(state.weather.get_history().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jakarta() -> GeoPoint {
        GeoPoint::new(-6.2088, 106.8456)
    }

    #[test]
    fn test_missing_coordinates_use_default() {
        let point = LocationQuery::default().resolve(jakarta()).unwrap();
        assert_eq!(point, jakarta());
    }

    #[test]
    fn test_partial_query_fills_missing_coordinate() {
        let query = LocationQuery {
            lat: Some("-7.25".to_string()),
            lon: None,
        };
        let point = query.resolve(jakarta()).unwrap();
        assert_eq!(point, GeoPoint::new(-7.25, 106.8456));
    }

    #[test]
    fn test_non_numeric_coordinate_is_rejected() {
        let query = LocationQuery {
            lat: Some("north".to_string()),
            lon: Some("106.8".to_string()),
        };
        match query.resolve(jakarta()) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "lat"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_coordinate_is_rejected() {
        let query = LocationQuery {
            lat: Some("91".to_string()),
            lon: Some("106.8".to_string()),
        };
        assert!(matches!(
            query.resolve(jakarta()),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_nan_coordinate_is_rejected() {
        let query = LocationQuery {
            lat: Some("NaN".to_string()),
            lon: None,
        };
        assert!(query.resolve(jakarta()).is_err());
    }
}
