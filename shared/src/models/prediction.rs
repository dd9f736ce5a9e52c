//! Flood risk prediction models
//!
//! The inference model consumes a fixed window of observations. When the
//! model cannot be reached, the rainfall heuristic in this module answers
//! instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of time steps the model expects per request
pub const SEQUENCE_LENGTH: usize = 5;

/// Category the model uses for "no flood risk"
pub const SAFE_CATEGORY: &str = "Aman";
pub const SAFE_FALLBACK_CATEGORY: &str = "Aman (Fallback)";
pub const ALERT_FALLBACK_CATEGORY: &str = "Siaga (Fallback)";

/// Total window rainfall above which the fallback raises an alert, mm
pub const FALLBACK_RAINFALL_THRESHOLD_MM: f64 = 50.0;
pub const FALLBACK_ALERT_PROBABILITY: f64 = 85.0;
pub const FALLBACK_SAFE_PROBABILITY: f64 = 10.0;

pub const FALLBACK_NOTE: &str = "Inference service offline";

/// One time step of model input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    pub rainfall: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

impl FeatureVector {
    /// Column order expected by the model: rainfall, temperature, humidity, pressure
    pub fn to_array(&self) -> [f64; 4] {
        [self.rainfall, self.temperature, self.humidity, self.pressure]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("at least one observation is required to build a feature window")]
    Empty,
}

/// Exactly [`SEQUENCE_LENGTH`] observations, oldest first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureWindow([FeatureVector; SEQUENCE_LENGTH]);

impl FeatureWindow {
    /// Build a window from chronological observations.
    ///
    /// Only the most recent [`SEQUENCE_LENGTH`] observations are kept. A short
    /// input is padded by repeating its last observation.
    pub fn from_observations(observations: &[FeatureVector]) -> Result<Self, WindowError> {
        let recent = &observations[observations.len().saturating_sub(SEQUENCE_LENGTH)..];
        let last = *recent.last().ok_or(WindowError::Empty)?;

        Ok(Self(std::array::from_fn(|i| {
            recent.get(i).copied().unwrap_or(last)
        })))
    }

    pub fn steps(&self) -> &[FeatureVector] {
        &self.0
    }

    pub fn total_rainfall(&self) -> f64 {
        self.0.iter().map(|step| step.rainfall).sum()
    }

    /// Rows in model column order, one per time step
    pub fn to_rows(&self) -> Vec<[f64; 4]> {
        self.0.iter().map(FeatureVector::to_array).collect()
    }
}

/// Risk classification returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskClassification {
    /// 0 for safe, 1 for any elevated category
    #[serde(rename = "result")]
    pub result_flag: u8,
    pub category: String,
    /// 0-100
    pub probability: f64,
    #[serde(default, skip_serializing)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RiskClassification {
    /// Classification reported by the inference model
    pub fn from_model(category: impl Into<String>, probability: f64) -> Self {
        let category = category.into();
        Self {
            result_flag: u8::from(category != SAFE_CATEGORY),
            category,
            probability,
            degraded: false,
            note: None,
        }
    }

    /// Rainfall heuristic used when the model is unavailable.
    ///
    /// Depends only on the window contents.
    pub fn fallback(window: &FeatureWindow) -> Self {
        let alert = window.total_rainfall() > FALLBACK_RAINFALL_THRESHOLD_MM;
        let (category, probability) = if alert {
            (ALERT_FALLBACK_CATEGORY, FALLBACK_ALERT_PROBABILITY)
        } else {
            (SAFE_FALLBACK_CATEGORY, FALLBACK_SAFE_PROBABILITY)
        };

        Self {
            result_flag: u8::from(alert),
            category: category.to_string(),
            probability,
            degraded: true,
            note: Some(FALLBACK_NOTE.to_string()),
        }
    }

    pub fn is_alert(&self) -> bool {
        self.result_flag == 1
    }
}
