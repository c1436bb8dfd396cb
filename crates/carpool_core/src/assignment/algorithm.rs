use crate::cache::CarpoolCaches;
use crate::model::User;

use super::types::Assignment;

/// Trait for strategies that distribute passengers over a candidate driver
/// group.
///
/// The bundled greedy implementation is a documented approximation; an exact
/// solver (e.g. min-cost flow) can be swapped in behind this trait without
/// touching the optimizer's orchestration.
pub trait AssignmentStrategy: Send + Sync {
    /// Place `passengers` into the vehicles of `drivers`.
    ///
    /// Returns one [`Assignment`] per driver, in driver order, including
    /// drivers that end up with zero passengers. Passengers that do not fit
    /// under `max_capacity` are left out of the result. Pairwise distances
    /// are read through `caches`.
    fn assign(
        &self,
        drivers: &[User],
        passengers: &[User],
        max_capacity: usize,
        caches: &CarpoolCaches,
    ) -> Vec<Assignment>;
}
