//! Weighted scoring of candidate carpool plans.
//!
//! Each plan earns three sub-scores mapped through discrete threshold
//! ladders (deliberately not continuous, so scores stay stable under small
//! input jitter and are easy to assert in tests), then a weighted composite
//! in `[0, 100]` rounded to two decimals.

use serde::{Deserialize, Serialize};

use crate::routing::RouteMetric;

/// Composite weights. Must sum to 1.0.
pub const DISTANCE_WEIGHT: f64 = 0.40;
pub const DURATION_WEIGHT: f64 = 0.35;
pub const PASSENGER_WEIGHT: f64 = 0.25;

/// Distance ladder: `(upper bound in km, score)`, checked top-down.
const DISTANCE_THRESHOLDS: [(f64, u32); 4] = [(5.0, 100), (15.0, 80), (30.0, 60), (50.0, 40)];
const DISTANCE_FLOOR_SCORE: u32 = 20;

/// Duration ladder: `(upper bound in minutes, score)`, checked top-down.
const DURATION_THRESHOLDS: [(f64, u32); 4] = [(10.0, 100), (25.0, 80), (45.0, 60), (75.0, 40)];
const DURATION_FLOOR_SCORE: u32 = 20;

/// Sub-scores and the weighted composite for one candidate plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub distance_score: u32,
    pub duration_score: u32,
    pub passenger_score: u32,
    pub total_score: f64,
}

fn ladder_score(value: f64, thresholds: &[(f64, u32)], floor: u32) -> u32 {
    for (max, score) in thresholds {
        if value <= *max {
            return *score;
        }
    }
    floor
}

/// Score for total route distance in km. Unreachable or non-positive
/// distances score zero.
pub fn calculate_distance_score(distance_km: RouteMetric) -> u32 {
    match distance_km.known() {
        Some(km) if km > 0.0 => ladder_score(km, &DISTANCE_THRESHOLDS, DISTANCE_FLOOR_SCORE),
        _ => 0,
    }
}

/// Score for total route duration in minutes. Unreachable or non-positive
/// durations score zero.
pub fn calculate_duration_score(duration_min: RouteMetric) -> u32 {
    match duration_min.known() {
        Some(min) if min > 0.0 => ladder_score(min, &DURATION_THRESHOLDS, DURATION_FLOOR_SCORE),
        _ => 0,
    }
}

/// Score for the number of passengers sharing the ride. Two or more fill the
/// vehicle; an empty car scores zero.
pub fn calculate_passenger_score(passenger_count: usize) -> u32 {
    match passenger_count {
        0 => 0,
        1 => 70,
        _ => 100,
    }
}

/// Combine the three sub-scores into the weighted composite.
pub fn calculate_total_score(
    distance_km: RouteMetric,
    duration_min: RouteMetric,
    passenger_count: usize,
) -> Score {
    let distance_score = calculate_distance_score(distance_km);
    let duration_score = calculate_duration_score(duration_min);
    let passenger_score = calculate_passenger_score(passenger_count);

    let weighted = f64::from(distance_score) * DISTANCE_WEIGHT
        + f64::from(duration_score) * DURATION_WEIGHT
        + f64::from(passenger_score) * PASSENGER_WEIGHT;

    Score {
        distance_score,
        duration_score,
        passenger_score,
        total_score: round2(weighted),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
