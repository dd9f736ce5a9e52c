//! Common types used across the platform

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Approximate length of one degree of latitude, in kilometres
pub const KM_PER_DEGREE: f64 = 111.0;

/// A point on the map in raw WGS84 degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct GeoPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Planar squared distance on raw degree values.
    ///
    /// Only meaningful over small regional extents; no projection is applied.
    pub fn squared_distance_to(&self, other: &GeoPoint) -> f64 {
        let d_lat = self.latitude - other.latitude;
        let d_lon = self.longitude - other.longitude;
        d_lat * d_lat + d_lon * d_lon
    }

    /// Rough distance in kilometres, for log output only
    pub fn approx_distance_km(&self, other: &GeoPoint) -> f64 {
        self.squared_distance_to(other).sqrt() * KM_PER_DEGREE
    }
}

/// Envelope used by every successful JSON response: `{ "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_distance_is_symmetric() {
        let a = GeoPoint::new(-6.2088, 106.8456);
        let b = GeoPoint::new(-6.1751, 106.8650);
        assert_eq!(a.squared_distance_to(&b), b.squared_distance_to(&a));
        assert_eq!(a.squared_distance_to(&a), 0.0);
    }

    #[test]
    fn test_approx_distance_km() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        assert!((a.approx_distance_km(&b) - 111.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_finite() {
        assert!(GeoPoint::new(-6.2, 106.8).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 106.8).is_finite());
        assert!(!GeoPoint::new(-6.2, f64::INFINITY).is_finite());
    }
}
