//! Regional categorical forecast models
//!
//! The regional provider publishes one textual forecast per administrative
//! area. A request point is matched to the closest area and that area's
//! current description is turned into a 0-100 risk score.

use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// One categorical forecast slot for an area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CategoricalForecastEntry {
    pub description: Option<String>,
    pub local_datetime: Option<String>,
}

impl CategoricalForecastEntry {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            local_datetime: None,
        }
    }
}

/// A named regional forecast area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionalArea {
    pub name: String,
    /// `None` when the provider omitted or garbled the coordinates
    pub location: Option<GeoPoint>,
    /// Chronological forecast slots, already flattened at ingestion
    pub forecast_entries: Vec<CategoricalForecastEntry>,
}

impl RegionalArea {
    /// Description of the first forecast slot.
    ///
    /// Later slots are ignored; the first one is treated as "now".
    pub fn current_description(&self) -> Option<&str> {
        self.forecast_entries
            .first()
            .and_then(|entry| entry.description.as_deref())
    }
}

/// Find the area closest to `target` by planar squared distance.
///
/// Areas without usable coordinates are skipped. On an exact tie the area
/// seen first wins. Returns `None` when nothing could be matched.
pub fn find_nearest<'a>(target: &GeoPoint, areas: &'a [RegionalArea]) -> Option<&'a RegionalArea> {
    let mut nearest: Option<(&RegionalArea, f64)> = None;

    for area in areas {
        let Some(location) = area.location.filter(GeoPoint::is_finite) else {
            continue;
        };

        let distance = target.squared_distance_to(&location);
        if distance.is_nan() {
            continue;
        }

        let closer = nearest.map_or(true, |(_, best)| distance < best);
        if closer {
            nearest = Some((area, distance));
        }
    }

    nearest.map(|(area, _)| area)
}

/// Score used when no rule matches, including absent or blank descriptions
pub const DEFAULT_RISK_SCORE: u8 = 10;

/// Keyword rules in priority order. The first rule with a matching keyword
/// decides the score, so the order of this table is part of the contract.
const RISK_RULES: &[(&[&str], u8)] = &[
    (&["petir", "badai", "ekstrem", "lightning", "storm", "extreme"], 95),
    (&["lebat", "heavy"], 85),
    (&["sedang", "moderate"], 65),
    (&["ringan", "hujan", "light rain", "rain"], 40),
    (&["berawan", "mendung", "cloudy", "overcast"], 20),
    (&["cerah", "panas", "clear", "hot"], 5),
];

/// Convert a free-text categorical forecast into a precipitation-probability
/// equivalent in `0..=100`.
pub fn map_to_score(description: Option<&str>) -> u8 {
    let Some(text) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return DEFAULT_RISK_SCORE;
    };

    let lowered = text.to_lowercase();
    RISK_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_RISK_SCORE)
}
