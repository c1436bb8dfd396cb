//! Domain types shared across the optimizer and the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::routing::RouteResult;
use crate::scoring::Score;

pub type UserId = u64;
pub type EventId = u64;

/// A registered user. Identity is the id; the coordinate is optional and
/// routing degrades to the unreachable sentinel when it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub coordinate: Option<Coordinate>,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, coordinate: Option<Coordinate>) -> Self {
        Self {
            id,
            username: username.into(),
            coordinate,
        }
    }
}

/// An event with an optional venue coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub coordinate: Option<Coordinate>,
    pub creator_id: UserId,
    pub is_public: bool,
}

/// One user's attendance record for one event. Only records with
/// `attended == true` make the user eligible for carpool participation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub user_id: UserId,
    pub event_id: EventId,
    pub attended: bool,
}

/// Per-user privacy settings consumed by the visibility rule chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacySettings {
    pub user_id: UserId,
    pub is_anonymous: bool,
    pub anonymous_name: Option<String>,
}

/// A ranked carpool plan returned by the optimizer. Owns copies of the
/// identity fields it displays; it never references back into the store.
#[derive(Debug, Clone, Serialize)]
pub struct CarpoolPlan {
    pub driver: User,
    pub passengers: Vec<User>,
    pub event: Event,
    pub route: RouteResult,
    pub score: Score,
}
