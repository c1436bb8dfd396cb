//! Geographic primitives: coordinates and straight-line distance.
//!
//! Road distances come from a [`crate::routing::RouteProvider`]; the haversine
//! distance here is the cheap approximation used to rank passenger-to-driver
//! proximity before any routing call is made.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees. Immutable value type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine great-circle distance between two coordinates, in kilometres.
///
/// Total function: any two valid coordinates produce a finite, non-negative
/// result.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(37.7749, -122.4194);
        let b = Coordinate::new(37.8044, -122.2712);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = Coordinate::new(37.7749, -122.4194);
        assert_eq!(distance_km(a, a), 0.0);
    }

    #[test]
    fn sf_to_oakland_is_about_13_km() {
        let sf = Coordinate::new(37.7749, -122.4194);
        let oakland = Coordinate::new(37.8044, -122.2712);
        let d = distance_km(sf, oakland);
        assert!(d > 12.0 && d < 14.5, "unexpected distance: {}", d);
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let d = distance_km(a, b);
        assert!((d - std::f64::consts::PI * 6371.0).abs() < 1.0);
    }
}
