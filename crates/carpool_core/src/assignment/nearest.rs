use crate::cache::{distance_key, CarpoolCaches};
use crate::geo;
use crate::model::User;
use crate::routing::RouteMetric;

use super::algorithm::AssignmentStrategy;
use super::types::Assignment;

/// Nearest-driver greedy assignment with a global sort.
///
/// Every passenger records their nearest driver, then all
/// (passenger, driver, distance) tuples are sorted ascending by distance and
/// walked in order. Placing globally-closest passengers first minimizes the
/// total assigned distance at the cost of strict per-passenger optimality:
/// a passenger can lose a seat with their own nearest driver to someone the
/// sort placed earlier.
#[derive(Debug, Default)]
pub struct NearestDriverAssignment;

impl NearestDriverAssignment {
    /// Straight-line passenger-to-driver distance, read through the distance
    /// cache. Missing coordinates on either side yield the unreachable
    /// sentinel and are never cached.
    fn cached_distance(passenger: &User, driver: &User, caches: &CarpoolCaches) -> RouteMetric {
        let (Some(from), Some(to)) = (passenger.coordinate, driver.coordinate) else {
            return RouteMetric::Unreachable;
        };

        let key = distance_key(passenger, driver);
        if let Some(cached) = caches.distance(&key) {
            return RouteMetric::Known(cached);
        }

        let computed = geo::distance_km(from, to);
        caches.store_distance(key, computed);
        RouteMetric::Known(computed)
    }
}

impl AssignmentStrategy for NearestDriverAssignment {
    fn assign(
        &self,
        drivers: &[User],
        passengers: &[User],
        max_capacity: usize,
        caches: &CarpoolCaches,
    ) -> Vec<Assignment> {
        let mut assignments: Vec<Assignment> =
            drivers.iter().cloned().map(Assignment::new).collect();
        if assignments.is_empty() {
            return assignments;
        }

        // (passenger index, nearest driver index, sort key). Ties keep the
        // first driver; the stable sort keeps passenger input order on equal
        // distances.
        let mut ranked: Vec<(usize, usize, f64)> = passengers
            .iter()
            .enumerate()
            .map(|(pi, passenger)| {
                let mut nearest = 0usize;
                let mut best = f64::INFINITY;
                for (di, driver) in drivers.iter().enumerate() {
                    let dist = Self::cached_distance(passenger, driver, caches).sort_key();
                    if dist < best {
                        best = dist;
                        nearest = di;
                    }
                }
                (pi, nearest, best)
            })
            .collect();
        ranked.sort_by(|a, b| a.2.total_cmp(&b.2));

        for (pi, di, dist) in ranked {
            if dist.is_finite() {
                if assignments[di].has_spare_seat(max_capacity) {
                    assignments[di].passengers.push(passengers[pi].clone());
                }
            } else if let Some(open) = assignments
                .iter()
                .position(|a| a.has_spare_seat(max_capacity))
            {
                // No finite distance to any driver: still seat the passenger
                // somewhere if a vehicle has room.
                assignments[open].passengers.push(passengers[pi].clone());
            }
        }

        assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::model::UserId;
    use std::collections::HashSet;

    const MAX_CAPACITY: usize = 3;

    fn user(id: UserId, lat: f64, lng: f64) -> User {
        User::new(id, format!("user{}", id), Some(Coordinate::new(lat, lng)))
    }

    fn user_without_coordinate(id: UserId) -> User {
        User::new(id, format!("user{}", id), None)
    }

    #[test]
    fn passengers_go_to_their_nearest_driver() {
        let caches = CarpoolCaches::default();
        let driver_a = user(1, 37.70, -122.40);
        let driver_b = user(2, 37.90, -122.40);
        let near_a = user(3, 37.71, -122.40);
        let near_b = user(4, 37.89, -122.40);

        let assignments = NearestDriverAssignment.assign(
            &[driver_a, driver_b],
            &[near_a, near_b],
            MAX_CAPACITY,
            &caches,
        );

        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].passengers[0].id, 3);
        assert_eq!(assignments[1].passengers[0].id, 4);
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let caches = CarpoolCaches::default();
        let driver = user(1, 37.70, -122.40);
        let passengers: Vec<User> = (2..=6).map(|id| user(id, 37.71, -122.40)).collect();

        let assignments =
            NearestDriverAssignment.assign(&[driver], &passengers, MAX_CAPACITY, &caches);

        assert_eq!(assignments.len(), 1);
        assert!(assignments[0].passengers.len() <= MAX_CAPACITY - 1);
    }

    #[test]
    fn no_passenger_is_assigned_twice() {
        let caches = CarpoolCaches::default();
        let drivers = vec![user(1, 37.70, -122.40), user(2, 37.72, -122.40)];
        let passengers: Vec<User> = (3..=8).map(|id| user(id, 37.71, -122.40)).collect();

        let assignments =
            NearestDriverAssignment.assign(&drivers, &passengers, MAX_CAPACITY, &caches);

        let mut seen: HashSet<UserId> = HashSet::new();
        for assignment in &assignments {
            for passenger in &assignment.passengers {
                assert!(seen.insert(passenger.id), "passenger assigned twice");
            }
        }
    }

    #[test]
    fn closest_passengers_are_placed_first() {
        let caches = CarpoolCaches::default();
        let driver = user(1, 37.70, -122.40);
        // Listed farthest-first; the global sort must still seat the two
        // closest and drop the farthest.
        let far = user(2, 38.50, -122.40);
        let mid = user(3, 37.75, -122.40);
        let near = user(4, 37.71, -122.40);

        let assignments =
            NearestDriverAssignment.assign(&[driver], &[far, mid, near], MAX_CAPACITY, &caches);

        let seated: Vec<UserId> = assignments[0].passengers.iter().map(|p| p.id).collect();
        assert_eq!(seated, vec![4, 3]);
    }

    #[test]
    fn passenger_without_coordinates_still_gets_a_seat() {
        let caches = CarpoolCaches::default();
        let driver = user(1, 37.70, -122.40);
        let lost = user_without_coordinate(2);

        let assignments =
            NearestDriverAssignment.assign(&[driver], &[lost], MAX_CAPACITY, &caches);

        assert_eq!(assignments[0].passengers.len(), 1);
        assert_eq!(assignments[0].passengers[0].id, 2);
    }

    #[test]
    fn unreachable_passengers_order_after_reachable_ones() {
        let caches = CarpoolCaches::default();
        let driver = user(1, 37.70, -122.40);
        let lost = user_without_coordinate(2);
        let near_a = user(3, 37.71, -122.40);
        let near_b = user(4, 37.72, -122.40);

        let assignments = NearestDriverAssignment.assign(
            &[driver],
            &[lost, near_a, near_b],
            MAX_CAPACITY,
            &caches,
        );

        // Both reachable passengers fill the car before the fallback runs.
        let seated: Vec<UserId> = assignments[0].passengers.iter().map(|p| p.id).collect();
        assert_eq!(seated, vec![3, 4]);
    }

    #[test]
    fn drivers_with_no_passengers_are_still_returned() {
        let caches = CarpoolCaches::default();
        let driver_a = user(1, 37.70, -122.40);
        let driver_b = user(2, 40.00, -100.00);
        let near_a = user(3, 37.71, -122.40);

        let assignments =
            NearestDriverAssignment.assign(&[driver_a, driver_b], &[near_a], MAX_CAPACITY, &caches);

        assert_eq!(assignments.len(), 2);
        assert!(assignments[1].passengers.is_empty());
    }
}
