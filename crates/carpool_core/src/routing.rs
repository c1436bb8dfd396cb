//! Pluggable route providers: trait abstraction for routing backends.
//!
//! Two implementations, selectable at construction time:
//!
//! - **`HaversineRouteProvider`**: straight-line legs + average-speed duration
//!   estimate. Zero dependencies, always available.
//! - **`MapboxRouteProvider`** (feature `mapbox`): calls the Mapbox Directions
//!   HTTP API for road distances and turn-by-turn steps.
//!
//! Providers never fail: a route that cannot be computed (missing waypoints,
//! network error, malformed response) comes back with every metric set to
//! [`RouteMetric::Unreachable`] so one bad candidate never aborts an
//! optimization run.

use serde::{Deserialize, Serialize};

use crate::geo::{distance_km, Coordinate};

/// Average city driving speed used for duration estimates (km/h).
const AVG_SPEED_KMH: f64 = 40.0;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// A distance or duration that may be unreachable.
///
/// Unreachable is a dedicated variant rather than `f64::INFINITY` so that it
/// can never leak into weighted-sum arithmetic; scoring and sorting must
/// handle it explicitly. Serialized as a nullable number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum RouteMetric {
    Known(f64),
    Unreachable,
}

impl RouteMetric {
    /// The finite value, if there is one.
    pub fn known(self) -> Option<f64> {
        match self {
            RouteMetric::Known(v) => Some(v),
            RouteMetric::Unreachable => None,
        }
    }

    pub fn is_unreachable(self) -> bool {
        matches!(self, RouteMetric::Unreachable)
    }

    /// Sort key: unreachable orders after every finite value. The infinity
    /// never escapes comparison contexts.
    pub fn sort_key(self) -> f64 {
        match self {
            RouteMetric::Known(v) => v,
            RouteMetric::Unreachable => f64::INFINITY,
        }
    }
}

impl From<Option<f64>> for RouteMetric {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => RouteMetric::Known(v),
            _ => RouteMetric::Unreachable,
        }
    }
}

impl From<RouteMetric> for Option<f64> {
    fn from(value: RouteMetric) -> Self {
        value.known()
    }
}

/// A single maneuver within a leg. Distances in metres, durations in seconds,
/// both rounded to whole numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// One leg between consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_km: f64,
    pub duration_min: f64,
    pub steps: Vec<RouteStep>,
}

/// Result of a route query over an ordered waypoint list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub distance_km: RouteMetric,
    pub duration_min: RouteMetric,
    pub legs: Vec<RouteLeg>,
}

impl RouteResult {
    /// The sentinel result for a route that cannot be computed.
    pub fn unreachable() -> Self {
        Self {
            distance_km: RouteMetric::Unreachable,
            duration_min: RouteMetric::Unreachable,
            legs: Vec::new(),
        }
    }
}

/// Trait for routing backends.
///
/// `waypoints[0]` is the driver's origin, the last entry is the event
/// location, and intermediate points are passenger pickups in the order
/// supplied. Implementations must be `Send + Sync` so a provider can be
/// shared behind an `Arc` by concurrent request handlers.
pub trait RouteProvider: Send + Sync {
    fn route(&self, waypoints: &[Coordinate]) -> RouteResult;
}

// ---------------------------------------------------------------------------
// Haversine provider (always available)
// ---------------------------------------------------------------------------

/// Straight-line fallback provider: sums haversine leg distances and
/// estimates duration at 40 km/h average city speed. Produces no
/// turn-by-turn steps.
pub struct HaversineRouteProvider;

impl RouteProvider for HaversineRouteProvider {
    fn route(&self, waypoints: &[Coordinate]) -> RouteResult {
        if waypoints.len() < 2 {
            return RouteResult::unreachable();
        }

        let mut legs = Vec::with_capacity(waypoints.len() - 1);
        let mut total_km = 0.0;
        for pair in waypoints.windows(2) {
            let leg_km = distance_km(pair[0], pair[1]);
            let leg_min = (leg_km / AVG_SPEED_KMH) * 60.0;
            total_km += leg_km;
            legs.push(RouteLeg {
                distance_km: leg_km,
                duration_min: leg_min,
                steps: Vec::new(),
            });
        }

        RouteResult {
            distance_km: RouteMetric::Known(total_km),
            duration_min: RouteMetric::Known((total_km / AVG_SPEED_KMH) * 60.0),
            legs,
        }
    }
}

#[cfg(feature = "mapbox")]
pub mod mapbox;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_provider_sums_legs() {
        let provider = HaversineRouteProvider;
        let a = Coordinate::new(37.7749, -122.4194);
        let b = Coordinate::new(37.7849, -122.4094);
        let c = Coordinate::new(37.8044, -122.2712);

        let result = provider.route(&[a, b, c]);
        assert_eq!(result.legs.len(), 2);

        let leg_sum: f64 = result.legs.iter().map(|l| l.distance_km).sum();
        let total = result.distance_km.known().expect("finite distance");
        assert!((total - leg_sum).abs() < 1e-9);
        assert!(result.duration_min.known().expect("finite duration") > 0.0);
    }

    #[test]
    fn too_few_waypoints_is_unreachable() {
        let provider = HaversineRouteProvider;
        let a = Coordinate::new(37.7749, -122.4194);
        let result = provider.route(&[a]);
        assert!(result.distance_km.is_unreachable());
        assert!(result.duration_min.is_unreachable());
        assert!(result.legs.is_empty());
    }

    #[test]
    fn metric_serializes_as_nullable_number() {
        let known = serde_json::to_string(&RouteMetric::Known(12.5)).unwrap();
        assert_eq!(known, "12.5");
        let unreachable = serde_json::to_string(&RouteMetric::Unreachable).unwrap();
        assert_eq!(unreachable, "null");

        let parsed: RouteMetric = serde_json::from_str("null").unwrap();
        assert!(parsed.is_unreachable());
    }

    #[test]
    fn metric_sort_key_orders_unreachable_last() {
        let mut metrics = vec![
            RouteMetric::Unreachable,
            RouteMetric::Known(5.0),
            RouteMetric::Known(1.0),
        ];
        metrics.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));
        assert_eq!(metrics[0], RouteMetric::Known(1.0));
        assert_eq!(metrics[2], RouteMetric::Unreachable);
    }
}
