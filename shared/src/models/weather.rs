//! Weather data models and the hourly fusion rule

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Location label of a placeholder result. Clients compare against it to
/// detect degraded mode without inspecting every field.
pub const DEGRADED_LOCATION: &str = "Mode Offline";

/// Placeholder values used when the gridded provider is unavailable
pub const PLACEHOLDER_TEMPERATURE: f64 = 30.0;
pub const PLACEHOLDER_HUMIDITY: f64 = 80.0;
pub const PLACEHOLDER_RAIN_PROBABILITY: u8 = 50;
pub const PLACEHOLDER_SPACING_HOURS: i64 = 3;

/// One forecast step as delivered by the gridded provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GriddedForecastEntry {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    /// Native probability of precipitation, 0-1
    pub pop: f64,
    pub rain_1h_mm: Option<f64>,
    pub rain_3h_mm: Option<f64>,
}

impl GriddedForecastEntry {
    /// Hourly precipitation volume. The provider mostly reports 3-hour
    /// accumulations, which are spread linearly over the slot.
    pub fn hourly_precipitation_mm(&self) -> f64 {
        self.rain_1h_mm
            .or_else(|| self.rain_3h_mm.map(|r| r / 3.0))
            .unwrap_or(0.0)
    }

    /// Gridded probability on the 0-100 scale
    pub fn probability_percent(&self) -> u8 {
        (self.pop.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Current conditions snapshot, as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CurrentConditions {
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub wind_speed: f64,
    /// Rain over the last hour, mm
    pub rain: f64,
}

/// Precipitation volume wrapper, serialized as `{"1h": mm}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct RainVolume {
    #[serde(rename = "1h")]
    pub one_hour: f64,
}

/// One step of the unified hourly series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(into = "HourlyWire", from = "HourlyWire")]
pub struct HourlyObservation {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability: u8,
}

#[derive(Serialize, Deserialize)]
struct HourlyWire {
    dt: i64,
    temp: f64,
    humidity: f64,
    rain: RainVolume,
    rain_prob: u8,
}

impl From<HourlyObservation> for HourlyWire {
    fn from(h: HourlyObservation) -> Self {
        HourlyWire {
            dt: h.timestamp,
            temp: h.temperature,
            humidity: h.humidity,
            rain: RainVolume {
                one_hour: h.precipitation_mm,
            },
            rain_prob: h.precipitation_probability,
        }
    }
}

impl From<HourlyWire> for HourlyObservation {
    fn from(w: HourlyWire) -> Self {
        HourlyObservation {
            timestamp: w.dt,
            temperature: w.temp,
            humidity: w.humidity,
            wind_speed: 0.0,
            precipitation_mm: w.rain.one_hour,
            precipitation_probability: w.rain_prob,
        }
    }
}

/// The unified weather answer for one point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnifiedWeatherResult {
    pub location: String,
    pub source_note: String,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyObservation>,
}

impl UnifiedWeatherResult {
    /// Best-effort answer when the gridded provider could not be reached
    pub fn placeholder(hourly: Vec<HourlyObservation>) -> Self {
        Self {
            location: DEGRADED_LOCATION.to_string(),
            source_note: "Data: offline placeholder".to_string(),
            current: CurrentConditions::default(),
            hourly,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.location == DEGRADED_LOCATION
    }
}

/// Merges the gridded hourly series with the regional categorical score
#[derive(Debug, Clone, Copy)]
pub struct ForecastFuser {
    window: usize,
}

impl Default for ForecastFuser {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

impl ForecastFuser {
    pub const DEFAULT_WINDOW: usize = 8;

    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Fuse up to `window` gridded steps with the categorical score.
    ///
    /// The categorical score is a floor: each step reports
    /// `max(round(pop * 100), categorical_score)`. Short input yields a short
    /// series; padding is the caller's concern.
    pub fn fuse(
        &self,
        gridded: &[GriddedForecastEntry],
        categorical_score: u8,
    ) -> Vec<HourlyObservation> {
        gridded
            .iter()
            .take(self.window)
            .map(|entry| HourlyObservation {
                timestamp: entry.timestamp,
                temperature: entry.temperature,
                humidity: entry.humidity,
                wind_speed: entry.wind_speed,
                precipitation_mm: entry.hourly_precipitation_mm(),
                precipitation_probability: entry.probability_percent().max(categorical_score),
            })
            .collect()
    }

    /// Exactly `window` synthetic steps, 3 hours apart, starting at `now`
    pub fn placeholder_hours(&self, now: DateTime<Utc>) -> Vec<HourlyObservation> {
        (0..self.window)
            .map(|i| HourlyObservation {
                timestamp: (now + Duration::hours(PLACEHOLDER_SPACING_HOURS * i as i64))
                    .timestamp(),
                temperature: PLACEHOLDER_TEMPERATURE,
                humidity: PLACEHOLDER_HUMIDITY,
                wind_speed: 0.0,
                precipitation_mm: 0.0,
                precipitation_probability: PLACEHOLDER_RAIN_PROBABILITY,
            })
            .collect()
    }

    /// `fuse` when the gridded series is available, placeholder hours otherwise
    pub fn fuse_or_placeholder(
        &self,
        gridded: Option<&[GriddedForecastEntry]>,
        categorical_score: u8,
        now: DateTime<Utc>,
    ) -> Vec<HourlyObservation> {
        match gridded {
            Some(entries) => self.fuse(entries, categorical_score),
            None => self.placeholder_hours(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dt: i64, pop: f64) -> GriddedForecastEntry {
        GriddedForecastEntry {
            timestamp: dt,
            temperature: 29.0,
            humidity: 80.0,
            wind_speed: 3.1,
            pop,
            rain_1h_mm: None,
            rain_3h_mm: None,
        }
    }

    #[test]
    fn test_categorical_score_is_a_floor() {
        let fuser = ForecastFuser::default();
        let hours = fuser.fuse(&[entry(0, 0.40), entry(3600, 0.90)], 65);
        assert_eq!(hours[0].precipitation_probability, 65);
        assert_eq!(hours[1].precipitation_probability, 90);
    }

    #[test]
    fn test_fuse_truncates_to_window() {
        let fuser = ForecastFuser::new(8);
        let gridded: Vec<_> = (0..40).map(|i| entry(i * 10800, 0.1)).collect();
        let hours = fuser.fuse(&gridded, 10);
        assert_eq!(hours.len(), 8);
        assert_eq!(hours[7].timestamp, 7 * 10800);
    }

    #[test]
    fn test_fuse_short_series_is_not_padded() {
        let fuser = ForecastFuser::new(8);
        let hours = fuser.fuse(&[entry(0, 0.2), entry(1, 0.2), entry(2, 0.2)], 10);
        assert_eq!(hours.len(), 3);
    }

    #[test]
    fn test_precipitation_deaggregation() {
        let mut e = entry(0, 0.5);
        assert_eq!(e.hourly_precipitation_mm(), 0.0);

        e.rain_3h_mm = Some(4.5);
        assert!((e.hourly_precipitation_mm() - 1.5).abs() < 1e-9);

        e.rain_1h_mm = Some(2.0);
        assert_eq!(e.hourly_precipitation_mm(), 2.0);
    }

    #[test]
    fn test_probability_rounding_and_clamping() {
        assert_eq!(entry(0, 0.306).probability_percent(), 31);
        assert_eq!(entry(0, 0.304).probability_percent(), 30);
        assert_eq!(entry(0, 1.7).probability_percent(), 100);
        assert_eq!(entry(0, -0.2).probability_percent(), 0);
    }

    #[test]
    fn test_placeholder_hours() {
        let fuser = ForecastFuser::default();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let hours = fuser.fuse_or_placeholder(None, 95, now);

        assert_eq!(hours.len(), 8);
        for (i, h) in hours.iter().enumerate() {
            assert_eq!(h.precipitation_probability, 50);
            assert_eq!(h.temperature, 30.0);
            assert_eq!(h.humidity, 80.0);
            assert_eq!(h.precipitation_mm, 0.0);
            assert_eq!(h.timestamp, 1_700_000_000 + i as i64 * 10800);
        }
    }

    #[test]
    fn test_hourly_wire_format() {
        let hour = HourlyObservation {
            timestamp: 1_700_000_000,
            temperature: 29.5,
            humidity: 81.0,
            wind_speed: 2.0,
            precipitation_mm: 1.5,
            precipitation_probability: 85,
        };
        let json = serde_json::to_value(&hour).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "dt": 1_700_000_000,
                "temp": 29.5,
                "humidity": 81.0,
                "rain": { "1h": 1.5 },
                "rain_prob": 85
            })
        );
    }

    #[test]
    fn test_placeholder_result_is_degraded() {
        let result = UnifiedWeatherResult::placeholder(Vec::new());
        assert!(result.is_degraded());
        assert_eq!(result.location, DEGRADED_LOCATION);
    }
}
