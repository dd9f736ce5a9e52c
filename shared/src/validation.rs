//! Validation utilities for the Flood Risk Gateway

use validator::Validate;

use crate::models::FeatureVector;
use crate::types::GeoPoint;

// ============================================================================
// Location Validations
// ============================================================================

/// Validate that a point is finite and inside WGS84 bounds
pub fn validate_coordinates(point: &GeoPoint) -> Result<(), &'static str> {
    if !point.is_finite() {
        return Err("Coordinates must be finite numbers");
    }
    point
        .validate()
        .map_err(|_| "Latitude must be within ±90 and longitude within ±180")
}

/// Check whether a point falls inside the Indonesian archipelago bounding box
pub fn is_within_indonesia(point: &GeoPoint) -> bool {
    (-11.0..=6.5).contains(&point.latitude) && (94.5..=141.5).contains(&point.longitude)
}

// ============================================================================
// Model Input / Output Validations
// ============================================================================

/// Validate a percentage reported by an upstream service
pub fn validate_percentage(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate one feature step before it is sent to the model
pub fn validate_feature_vector(features: &FeatureVector) -> Result<(), &'static str> {
    if !features.to_array().iter().all(|v| v.is_finite()) {
        return Err("Feature values must be finite numbers");
    }
    if features.rainfall < 0.0 {
        return Err("Rainfall cannot be negative");
    }
    if !(0.0..=100.0).contains(&features.humidity) {
        return Err("Humidity must be between 0 and 100%");
    }
    Ok(())
}
