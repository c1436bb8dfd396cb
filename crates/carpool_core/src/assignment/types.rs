use serde::Serialize;

use crate::model::User;

/// One driver and the passengers placed in their vehicle.
///
/// Invariant: `passengers.len() <= max_capacity - 1`, and within a single
/// candidate set a user appears as a passenger of at most one assignment and
/// never doubles as a driver.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub driver: User,
    pub passengers: Vec<User>,
}

impl Assignment {
    pub fn new(driver: User) -> Self {
        Self {
            driver,
            passengers: Vec::new(),
        }
    }

    /// Whether another passenger fits given the vehicle capacity (driver
    /// included).
    pub fn has_spare_seat(&self, max_capacity: usize) -> bool {
        self.passengers.len() < max_capacity.saturating_sub(1)
    }
}
