//! Seeded demo dataset: users scattered over a bounding box, one event, and
//! the attendance/privacy rows the optimizer and the HTTP surface read.
//!
//! Deterministic for a given seed so demo runs and benchmarks are
//! reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo::Coordinate;
use crate::model::{AttendanceRecord, Event, PrivacySettings, User};
use crate::store::InMemoryStore;

/// Default bounding box: San Francisco Bay Area (approx).
const DEFAULT_LAT_MIN: f64 = 37.6;
const DEFAULT_LAT_MAX: f64 = 37.85;
const DEFAULT_LNG_MIN: f64 = -122.55;
const DEFAULT_LNG_MAX: f64 = -122.35;

const DEMO_EVENT_ID: u64 = 1;

/// Every n-th user is seeded without a coordinate / with a skipped
/// attendance / as anonymous, so the degraded paths stay exercised.
const MISSING_COORDINATE_EVERY: u64 = 6;
const SKIPPED_ATTENDANCE_EVERY: u64 = 4;
const ANONYMOUS_EVERY: u64 = 7;

const NAMES: [&str; 10] = [
    "ada", "grace", "linus", "margaret", "dennis", "barbara", "ken", "radia", "edsger", "katherine",
];

/// Parameters for building a demo dataset.
#[derive(Debug, Clone)]
pub struct SeedParams {
    pub num_users: u64,
    pub seed: u64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self {
            num_users: 12,
            seed: 42,
            lat_min: DEFAULT_LAT_MIN,
            lat_max: DEFAULT_LAT_MAX,
            lng_min: DEFAULT_LNG_MIN,
            lng_max: DEFAULT_LNG_MAX,
        }
    }
}

impl SeedParams {
    pub fn with_num_users(mut self, num_users: u64) -> Self {
        self.num_users = num_users;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Build an in-memory store with one public event and `num_users` users.
pub fn seed_store(params: &SeedParams) -> InMemoryStore {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut store = InMemoryStore::new();

    store.insert_event(Event {
        id: DEMO_EVENT_ID,
        title: "Weekend Hackathon".to_string(),
        coordinate: Some(Coordinate::new(
            (params.lat_min + params.lat_max) / 2.0,
            (params.lng_min + params.lng_max) / 2.0,
        )),
        creator_id: 1,
        is_public: true,
    });

    for id in 1..=params.num_users {
        let coordinate = if id % MISSING_COORDINATE_EVERY == 0 {
            None
        } else {
            Some(Coordinate::new(
                rng.gen_range(params.lat_min..params.lat_max),
                rng.gen_range(params.lng_min..params.lng_max),
            ))
        };

        let name = NAMES[(id as usize - 1) % NAMES.len()];
        store.insert_user(User::new(id, format!("{}{}", name, id), coordinate));
        store.record_attendance(AttendanceRecord {
            user_id: id,
            event_id: DEMO_EVENT_ID,
            attended: id % SKIPPED_ATTENDANCE_EVERY != 0,
        });

        if id % ANONYMOUS_EVERY == 0 {
            store.set_privacy(PrivacySettings {
                user_id: id,
                is_anonymous: true,
                anonymous_name: Some(format!("Rider #{}", id)),
            });
        }
    }

    store
}

/// The id of the event seeded by [`seed_store`].
pub fn demo_event_id() -> u64 {
    DEMO_EVENT_ID
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStore;

    #[test]
    fn same_seed_produces_identical_stores() {
        let params = SeedParams::default().with_num_users(10);
        let a = seed_store(&params);
        let b = seed_store(&params);
        assert_eq!(a.list_users().unwrap(), b.list_users().unwrap());
    }

    #[test]
    fn seeded_store_has_event_users_and_attendance() {
        let params = SeedParams::default().with_num_users(12);
        let store = seed_store(&params);

        assert!(store.find_event(demo_event_id()).unwrap().is_some());
        assert_eq!(store.list_users().unwrap().len(), 12);

        let attendance = store.list_attendees(demo_event_id()).unwrap();
        assert_eq!(attendance.len(), 12);
        assert!(attendance.iter().any(|r| !r.attended));
        assert!(attendance.iter().filter(|r| r.attended).count() >= 2);
    }

    #[test]
    fn some_users_are_seeded_without_coordinates() {
        let params = SeedParams::default().with_num_users(12);
        let store = seed_store(&params);
        let users = store.list_users().unwrap();
        assert!(users.iter().any(|u| u.coordinate.is_none()));
        assert!(users.iter().any(|u| u.coordinate.is_some()));
    }
}
