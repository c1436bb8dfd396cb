//! Data-store abstraction consumed by the optimizer and the HTTP layer.
//!
//! The backing store is deliberately unspecified; the optimizer only needs
//! the queries below. `InMemoryStore` backs the demo server and the tests.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{AttendanceRecord, Event, EventId, PrivacySettings, User, UserId};

/// Store failures are unexpected/internal: they propagate to the caller
/// instead of degrading like routing failures do.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The queries the optimizer and the HTTP surface need.
pub trait EventStore: Send + Sync {
    fn find_event(&self, id: EventId) -> Result<Option<Event>, StoreError>;
    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    /// All users, ordered by id so downstream enumeration is deterministic.
    fn list_users(&self) -> Result<Vec<User>, StoreError>;
    fn list_attendees(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, StoreError>;
    fn find_privacy(&self, user_id: UserId) -> Result<Option<PrivacySettings>, StoreError>;
}

/// Map-backed store for the demo server and tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: BTreeMap<UserId, User>,
    events: BTreeMap<EventId, Event>,
    attendance: Vec<AttendanceRecord>,
    privacy: BTreeMap<UserId, PrivacySettings>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn insert_event(&mut self, event: Event) {
        self.events.insert(event.id, event);
    }

    pub fn record_attendance(&mut self, record: AttendanceRecord) {
        self.attendance.push(record);
    }

    pub fn set_privacy(&mut self, settings: PrivacySettings) {
        self.privacy.insert(settings.user_id, settings);
    }
}

impl EventStore for InMemoryStore {
    fn find_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.get(&id).cloned())
    }

    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.values().cloned().collect())
    }

    fn list_attendees(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(self
            .attendance
            .iter()
            .filter(|record| record.event_id == event_id)
            .copied()
            .collect())
    }

    fn find_privacy(&self, user_id: UserId) -> Result<Option<PrivacySettings>, StoreError> {
        Ok(self.privacy.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    #[test]
    fn lookups_round_trip() {
        let mut store = InMemoryStore::new();
        store.insert_user(User::new(1, "ada", Some(Coordinate::new(37.7, -122.4))));
        store.insert_event(Event {
            id: 10,
            title: "Launch Party".to_string(),
            coordinate: None,
            creator_id: 1,
            is_public: true,
        });
        store.record_attendance(AttendanceRecord {
            user_id: 1,
            event_id: 10,
            attended: true,
        });

        assert_eq!(store.find_user(1).unwrap().unwrap().username, "ada");
        assert_eq!(
            store.find_event(10).unwrap().unwrap().title,
            "Launch Party"
        );
        assert_eq!(store.list_attendees(10).unwrap().len(), 1);
        assert!(store.list_attendees(11).unwrap().is_empty());
    }

    #[test]
    fn missing_rows_are_none_not_errors() {
        let store = InMemoryStore::new();
        assert!(store.find_user(99).unwrap().is_none());
        assert!(store.find_event(99).unwrap().is_none());
        assert!(store.find_privacy(99).unwrap().is_none());
    }

    #[test]
    fn users_list_in_id_order() {
        let mut store = InMemoryStore::new();
        for id in [3, 1, 2] {
            store.insert_user(User::new(id, format!("user{}", id), None));
        }
        let ids: Vec<_> = store.list_users().unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
