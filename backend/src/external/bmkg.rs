//! Regional categorical forecast client
//!
//! Fetches the per-area forecast of one province from the BMKG public API
//! and normalizes it into [`RegionalArea`] values. The payload is loosely
//! typed: coordinates arrive as numbers or numeric strings, either on the
//! area itself or inside `lokasi`, and `cuaca` is a list nested to an
//! unpredictable depth. All of that is resolved here so the matcher only
//! sees one shape.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use shared::{CategoricalForecastEntry, GeoPoint, RegionalArea};

use crate::error::{AppError, AppResult};

const SERVICE: &str = "bmkg";

pub const UNKNOWN_AREA_NAME: &str = "Unknown area";

/// BMKG public forecast client
#[derive(Clone)]
pub struct BmkgClient {
    client: Client,
    base_url: String,
    region_code: String,
}

#[derive(Debug, Deserialize)]
struct BmkgResponse {
    data: Option<Vec<BmkgArea>>,
}

#[derive(Debug, Deserialize)]
struct BmkgArea {
    lat: Option<Value>,
    lon: Option<Value>,
    lokasi: Option<BmkgLokasi>,
    cuaca: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BmkgLokasi {
    kotakab: Option<String>,
    kecamatan: Option<String>,
    lat: Option<Value>,
    lon: Option<Value>,
}

impl BmkgClient {
    pub fn new(base_url: String, region_code: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("BMKG HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            region_code,
        })
    }

    /// Fetch every forecast area of the configured province
    pub async fn get_regional_areas(&self) -> AppResult<Vec<RegionalArea>> {
        let url = format!("{}/publik/prakiraan-cuaca", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("adm1", self.region_code.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::upstream(SERVICE, "request timed out")
                } else {
                    AppError::upstream(SERVICE, format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                SERVICE,
                format!("API returned {}: {}", status, body),
            ));
        }

        let payload: BmkgResponse = response
            .json()
            .await
            .map_err(|e| AppError::malformed(SERVICE, format!("failed to parse response: {}", e)))?;

        let areas = normalize_areas(payload);
        if areas.is_empty() {
            return Err(AppError::malformed(SERVICE, "response contains no areas"));
        }

        tracing::debug!(region = %self.region_code, areas = areas.len(), "BMKG areas fetched");
        Ok(areas)
    }
}

fn normalize_areas(payload: BmkgResponse) -> Vec<RegionalArea> {
    payload
        .data
        .unwrap_or_default()
        .into_iter()
        .map(normalize_area)
        .collect()
}

fn normalize_area(area: BmkgArea) -> RegionalArea {
    let lokasi = area.lokasi.as_ref();

    let lat = area
        .lat
        .as_ref()
        .and_then(parse_coordinate)
        .or_else(|| lokasi.and_then(|l| l.lat.as_ref()).and_then(parse_coordinate));
    let lon = area
        .lon
        .as_ref()
        .and_then(parse_coordinate)
        .or_else(|| lokasi.and_then(|l| l.lon.as_ref()).and_then(parse_coordinate));

    let name = lokasi
        .and_then(|l| non_blank(&l.kotakab).or_else(|| non_blank(&l.kecamatan)))
        .unwrap_or(UNKNOWN_AREA_NAME)
        .to_string();

    let mut forecast_entries = Vec::new();
    if let Some(cuaca) = &area.cuaca {
        flatten_entries(cuaca, &mut forecast_entries);
    }

    RegionalArea {
        name,
        location: lat.zip(lon).map(|(lat, lon)| GeoPoint::new(lat, lon)),
        forecast_entries,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Accepts `-6.2`, `"-6.2"` and `" -6.2 "`; anything else is missing
fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Depth-first flattening of `cuaca`, preserving order
fn flatten_entries(value: &Value, out: &mut Vec<CategoricalForecastEntry>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| flatten_entries(item, out)),
        Value::Object(fields) => out.push(CategoricalForecastEntry {
            description: fields
                .get("weather_desc")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            local_datetime: fields
                .get("local_datetime")
                .and_then(Value::as_str)
                .map(String::from),
        }),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(payload: Value) -> Vec<RegionalArea> {
        normalize_areas(serde_json::from_value(payload).unwrap())
    }

    #[test]
    fn test_nested_cuaca_is_flattened_in_order() {
        let areas = parse(json!({
            "data": [{
                "lat": -6.18, "lon": 106.83,
                "lokasi": { "kotakab": "Jakarta Pusat" },
                "cuaca": [
                    [{ "weather_desc": "Hujan Ringan", "local_datetime": "2026-10-16 07:00:00" },
                     { "weather_desc": "Berawan" }],
                    [[{ "weather_desc": "Cerah" }]]
                ]
            }]
        }));

        let descriptions: Vec<_> = areas[0]
            .forecast_entries
            .iter()
            .map(|e| e.description.as_deref())
            .collect();
        assert_eq!(descriptions, vec![Some("Hujan Ringan"), Some("Berawan"), Some("Cerah")]);
        assert_eq!(areas[0].current_description(), Some("Hujan Ringan"));
    }

    #[test]
    fn test_flat_cuaca_is_accepted() {
        let areas = parse(json!({
            "data": [{ "lat": "-6.2", "lon": "106.8", "cuaca": [{ "weather_desc": "Hujan Lebat" }] }]
        }));
        assert_eq!(areas[0].current_description(), Some("Hujan Lebat"));
        assert_eq!(areas[0].location, Some(GeoPoint::new(-6.2, 106.8)));
    }

    #[test]
    fn test_coordinates_fall_back_to_lokasi() {
        let areas = parse(json!({
            "data": [{ "lokasi": { "kecamatan": "Menteng", "lat": -6.19, "lon": "106.83" } }]
        }));
        assert_eq!(areas[0].name, "Menteng");
        assert_eq!(areas[0].location, Some(GeoPoint::new(-6.19, 106.83)));
        assert!(areas[0].forecast_entries.is_empty());
    }

    #[test]
    fn test_garbled_coordinates_are_missing() {
        let areas = parse(json!({
            "data": [
                { "lat": "n/a", "lon": 106.8 },
                { "lat": -6.2 },
                { "lat": null, "lon": null }
            ]
        }));
        assert!(areas.iter().all(|a| a.location.is_none()));
        assert!(areas.iter().all(|a| a.name == UNKNOWN_AREA_NAME));
    }

    #[test]
    fn test_name_fallback_chain() {
        let areas = parse(json!({
            "data": [
                { "lokasi": { "kotakab": "Kota Adm. Jakarta Barat", "kecamatan": "Kebon Jeruk" } },
                { "lokasi": { "kotakab": "  ", "kecamatan": "Kebon Jeruk" } }
            ]
        }));
        assert_eq!(areas[0].name, "Kota Adm. Jakarta Barat");
        assert_eq!(areas[1].name, "Kebon Jeruk");
    }

    #[test]
    fn test_missing_data_yields_no_areas() {
        assert!(parse(json!({})).is_empty());
        assert!(parse(json!({ "data": [] })).is_empty());
    }
}
