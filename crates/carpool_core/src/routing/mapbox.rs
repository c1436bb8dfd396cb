//! Blocking HTTP client for the Mapbox Directions API.
//!
//! Wraps `GET /directions/v5/mapbox/driving/{lng,lat;...}` with turn-by-turn
//! steps enabled and converts the response into [`RouteResult`] units
//! (kilometres / minutes, rounded). Any failure degrades to
//! [`RouteResult::unreachable`] at the [`RouteProvider`] boundary.

use reqwest::{blocking::Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::geo::Coordinate;
use crate::routing::{RouteLeg, RouteMetric, RouteProvider, RouteResult, RouteStep};

const DEFAULT_ENDPOINT: &str = "https://api.mapbox.com/directions/v5/mapbox/driving";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Thin HTTP client for Mapbox driving directions.
pub struct MapboxRouteProvider {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl MapboxRouteProvider {
    /// Create a provider against the public Mapbox API.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, access_token)
    }

    /// Create a provider against a custom endpoint (used to point tests at a
    /// local stub server).
    pub fn with_endpoint(endpoint: &str, access_token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build Mapbox client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    fn fetch(&self, waypoints: &[Coordinate]) -> Result<RouteResult, MapboxError> {
        if waypoints.len() < 2 {
            return Err(MapboxError::TooFewWaypoints);
        }

        let coord_segment = waypoints
            .iter()
            .map(|wp| format!("{},{}", wp.longitude, wp.latitude))
            .collect::<Vec<_>>()
            .join(";");

        let base = format!("{}/{}", self.endpoint, coord_segment);
        let mut url = Url::parse(&base)
            .map_err(|err| MapboxError::Api(format!("failed to build Mapbox URL: {}", err)))?;
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("geometries", "geojson")
            .append_pair("overview", "full")
            .append_pair("steps", "true");

        let response = self.client.get(url).send().map_err(MapboxError::Http)?;
        let parsed: DirectionsResponse = response.json().map_err(MapboxError::Json)?;
        parse_directions_response(parsed)
    }
}

impl RouteProvider for MapboxRouteProvider {
    fn route(&self, waypoints: &[Coordinate]) -> RouteResult {
        match self.fetch(waypoints) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, "directions request failed, marking unreachable");
                RouteResult::unreachable()
            }
        }
    }
}

/// Errors encountered while fetching directions.
#[derive(Debug)]
pub enum MapboxError {
    Http(reqwest::Error),
    Json(reqwest::Error),
    Api(String),
    NoRoute,
    TooFewWaypoints,
}

impl std::fmt::Display for MapboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapboxError::Http(err) => write!(f, "http error: {}", err),
            MapboxError::Json(err) => write!(f, "invalid response body: {}", err),
            MapboxError::Api(code) => write!(f, "api error: {}", code),
            MapboxError::NoRoute => write!(f, "no route in response"),
            MapboxError::TooFewWaypoints => write!(f, "need at least two waypoints"),
        }
    }
}

impl From<reqwest::Error> for MapboxError {
    fn from(err: reqwest::Error) -> Self {
        MapboxError::Http(err)
    }
}

#[derive(Deserialize)]
struct DirectionsResponse {
    code: String,
    routes: Option<Vec<DirectionsRoute>>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    distance: f64, // metres
    duration: f64, // seconds
    legs: Vec<DirectionsLeg>,
}

#[derive(Deserialize)]
struct DirectionsLeg {
    distance: f64,
    duration: f64,
    #[serde(default)]
    steps: Vec<DirectionsStep>,
}

#[derive(Deserialize)]
struct DirectionsStep {
    distance: f64,
    duration: f64,
    maneuver: DirectionsManeuver,
}

#[derive(Deserialize)]
struct DirectionsManeuver {
    instruction: String,
}

fn parse_directions_response(resp: DirectionsResponse) -> Result<RouteResult, MapboxError> {
    if resp.code != "Ok" {
        return Err(MapboxError::Api(resp.code));
    }

    let route = resp
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or(MapboxError::NoRoute)?;

    let legs = route
        .legs
        .into_iter()
        .map(|leg| RouteLeg {
            distance_km: (leg.distance / 1000.0).round(),
            duration_min: (leg.duration / 60.0).round(),
            steps: leg
                .steps
                .into_iter()
                .map(|step| RouteStep {
                    instruction: step.maneuver.instruction,
                    distance_m: step.distance.round(),
                    duration_s: step.duration.round(),
                })
                .collect(),
        })
        .collect();

    Ok(RouteResult {
        distance_km: RouteMetric::Known((route.distance / 1000.0).round()),
        duration_min: RouteMetric::Known((route.duration / 60.0).round()),
        legs,
    })
}
