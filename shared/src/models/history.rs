//! Records written to the history store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::prediction::{FeatureVector, RiskClassification};
use super::weather::CurrentConditions;

pub const WEATHER_HISTORY_COLLECTION: &str = "weather_history";
pub const LATEST_STATUS_COLLECTION: &str = "latest_status";
pub const PREDICTIONS_COLLECTION: &str = "predictions";

/// Field every history collection is ordered by
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// A point-in-time weather observation kept for charts and model input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherRecord {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub rainfall: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub location: String,
}

impl WeatherRecord {
    pub fn from_current(
        current: &CurrentConditions,
        location: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            temperature: current.temperature,
            humidity: current.humidity,
            pressure: current.pressure,
            rainfall: current.rain,
            timestamp,
            location: location.into(),
        }
    }

    pub fn to_features(&self) -> FeatureVector {
        FeatureVector {
            rainfall: self.rainfall,
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure,
        }
    }
}

/// A stored prediction, with the exact rows the model saw
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub input_features: Vec<[f64; 4]>,
    pub risk_score: f64,
    pub status: String,
    #[serde(default)]
    pub degraded: bool,
}

impl PredictionRecord {
    pub fn new(
        input_features: Vec<[f64; 4]>,
        classification: &RiskClassification,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            input_features,
            risk_score: classification.probability,
            status: classification.category.clone(),
            degraded: classification.degraded,
        }
    }
}
