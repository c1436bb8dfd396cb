//! Shared fixtures for tests: users, events, stores, and a route provider
//! that records how often it is called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::geo::Coordinate;
use crate::model::{AttendanceRecord, Event, EventId, User, UserId};
use crate::routing::{HaversineRouteProvider, RouteProvider, RouteResult};
use crate::store::InMemoryStore;

pub fn coord(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::new(latitude, longitude)
}

pub fn user(id: UserId, latitude: f64, longitude: f64) -> User {
    User::new(id, format!("user{}", id), Some(coord(latitude, longitude)))
}

pub fn user_without_coordinate(id: UserId) -> User {
    User::new(id, format!("user{}", id), None)
}

pub fn event(id: EventId, latitude: f64, longitude: f64) -> Event {
    Event {
        id,
        title: format!("event{}", id),
        coordinate: Some(coord(latitude, longitude)),
        creator_id: 1,
        is_public: true,
    }
}

/// Build a store with one event and the given users all marked attended.
pub fn store_with_attendees(event: Event, users: &[User]) -> InMemoryStore {
    let mut store = InMemoryStore::new();
    let event_id = event.id;
    store.insert_event(event);
    for user in users {
        store.insert_user(user.clone());
        store.record_attendance(AttendanceRecord {
            user_id: user.id,
            event_id,
            attended: true,
        });
    }
    store
}

/// Shared call counter for [`RecordingRouteProvider`]. Clone it before
/// handing the provider to an optimizer and read it afterwards.
#[derive(Clone, Default)]
pub struct RouteCallCounter(Arc<AtomicUsize>);

impl RouteCallCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Route provider that counts calls and either replays a fixed result or
/// falls through to the haversine estimate.
pub struct RecordingRouteProvider {
    counter: RouteCallCounter,
    fixed: Option<RouteResult>,
}

impl RecordingRouteProvider {
    pub fn new(counter: RouteCallCounter) -> Self {
        Self {
            counter,
            fixed: None,
        }
    }

    pub fn with_fixed(counter: RouteCallCounter, result: RouteResult) -> Self {
        Self {
            counter,
            fixed: Some(result),
        }
    }
}

impl RouteProvider for RecordingRouteProvider {
    fn route(&self, waypoints: &[Coordinate]) -> RouteResult {
        self.counter.increment();
        match &self.fixed {
            Some(result) => result.clone(),
            None => HaversineRouteProvider.route(waypoints),
        }
    }
}
