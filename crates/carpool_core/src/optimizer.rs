//! The carpool optimizer: orchestrates combination generation, passenger
//! assignment, cached routing, and scoring into a bounded ranked plan list.
//!
//! One `optimize` call is a single logical task; the only suspension points
//! are the routing calls, and those are already synchronous here. The caches
//! are process-wide and internally locked, so optimizer instances can be
//! shared behind an `Arc` by concurrent request handlers (see the
//! `clear_caches_on_run` note on [`OptimizerConfig`] for the cross-run
//! tradeoff that creates).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::assignment::{AssignmentStrategy, NearestDriverAssignment};
use crate::cache::{attendee_key, route_key, CarpoolCaches, DEFAULT_TTL};
use crate::combinations::generate_driver_groups;
use crate::model::{AttendanceRecord, CarpoolPlan, Event, EventId, User, UserId};
use crate::routing::{RouteProvider, RouteResult};
use crate::scoring::calculate_total_score;
use crate::store::{EventStore, StoreError};

/// Vehicle capacity, driver included: one driver plus up to two passengers.
pub const MAX_CAPACITY: usize = 3;

/// Upper bound on driver groups examined per run.
pub const MAX_COMBINATIONS: usize = 100;

/// Default length of the ranked plan list.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Tuning knobs for an optimizer instance.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub max_capacity: usize,
    pub max_results: usize,
    pub max_combinations: usize,
    pub cache_ttl: Duration,
    /// Drop every cache at the start of each run. On by default: it keeps a
    /// run from mixing distances across topology changes, at the price of
    /// making the TTL mostly inert across runs. Turn it off to let repeated
    /// identical requests reuse routing results within the TTL.
    pub clear_caches_on_run: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_capacity: MAX_CAPACITY,
            max_results: DEFAULT_MAX_RESULTS,
            max_combinations: MAX_COMBINATIONS,
            cache_ttl: DEFAULT_TTL,
            clear_caches_on_run: true,
        }
    }
}

impl OptimizerConfig {
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_clear_caches_on_run(mut self, clear: bool) -> Self {
        self.clear_caches_on_run = clear;
        self
    }
}

/// Failures that abort an optimization run. Routing failures never appear
/// here; they degrade to unreachable plans instead.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CarpoolOptimizer {
    store: Arc<dyn EventStore>,
    router: Box<dyn RouteProvider>,
    strategy: Box<dyn AssignmentStrategy>,
    caches: CarpoolCaches,
    config: OptimizerConfig,
}

impl CarpoolOptimizer {
    pub fn new(store: Arc<dyn EventStore>, router: Box<dyn RouteProvider>) -> Self {
        Self::with_config(store, router, OptimizerConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn EventStore>,
        router: Box<dyn RouteProvider>,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            store,
            router,
            strategy: Box::new(NearestDriverAssignment),
            caches: CarpoolCaches::new(config.cache_ttl),
            config,
        }
    }

    /// Swap the passenger-assignment strategy.
    pub fn with_strategy(mut self, strategy: Box<dyn AssignmentStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn caches(&self) -> &CarpoolCaches {
        &self.caches
    }

    /// Produce up to `max_results` carpool plans for the event, ranked by
    /// descending composite score.
    ///
    /// Returns an empty list when the event or requesting user is missing,
    /// or when the requester has no attended record for the event (the
    /// eligibility gate short-circuits before any combinatorial work).
    pub fn optimize(
        &self,
        event_id: EventId,
        requesting_user_id: UserId,
        max_results: usize,
    ) -> Result<Vec<CarpoolPlan>, OptimizeError> {
        if self.config.clear_caches_on_run {
            self.caches.clear_all();
        }

        let attendance = self.store.list_attendees(event_id)?;
        let requester_attended = attendance
            .iter()
            .any(|record| record.user_id == requesting_user_id && record.attended);
        if !requester_attended {
            debug!(event_id, requesting_user_id, "requester not an attendee, skipping run");
            return Ok(Vec::new());
        }

        let Some(event) = self.store.find_event(event_id)? else {
            debug!(event_id, "event not found");
            return Ok(Vec::new());
        };
        let Some(requesting_user) = self.store.find_user(requesting_user_id)? else {
            debug!(requesting_user_id, "requesting user not found");
            return Ok(Vec::new());
        };

        let attending = self.attending_users(event_id, &attendance)?;
        let groups = generate_driver_groups(&attending, self.config.max_capacity);
        let bound = groups.len().min(self.config.max_combinations);
        debug!(
            event_id,
            attendees = attending.len(),
            combinations = groups.len(),
            processed = bound,
            "optimizing carpool plans"
        );

        let mut plans: Vec<CarpoolPlan> = Vec::new();
        for group in groups.iter().take(bound) {
            let driver_ids: HashSet<UserId> = group.iter().map(|u| u.id).collect();
            let passengers: Vec<User> = attending
                .iter()
                .filter(|u| !driver_ids.contains(&u.id))
                .cloned()
                .collect();

            let assignments =
                self.strategy
                    .assign(group, &passengers, self.config.max_capacity, &self.caches);

            for assignment in assignments {
                if assignment.passengers.is_empty() {
                    continue;
                }

                // Scored on the organic passenger count, before the
                // requester is folded in.
                let organic_count = assignment.passengers.len();

                let mut riders = assignment.passengers.clone();
                let requester_is_driver = driver_ids.contains(&requesting_user_id);
                let requester_is_rider = riders.iter().any(|p| p.id == requesting_user_id);
                if !requester_is_driver
                    && !requester_is_rider
                    && riders.len() < self.config.max_capacity.saturating_sub(1)
                {
                    riders.push(requesting_user.clone());
                }

                let route = self.fetch_route(&assignment.driver, &riders, &event);
                let score =
                    calculate_total_score(route.distance_km, route.duration_min, organic_count);

                plans.push(CarpoolPlan {
                    driver: assignment.driver,
                    passengers: riders,
                    event: event.clone(),
                    route,
                    score,
                });
                plans.sort_by(|a, b| b.score.total_score.total_cmp(&a.score.total_score));
                plans.truncate(max_results);
            }
        }

        debug!(event_id, plans = plans.len(), "optimization finished");
        Ok(plans)
    }

    /// The single best plan, or `None` when no plan exists.
    pub fn optimal_route(
        &self,
        event_id: EventId,
        requesting_user_id: UserId,
    ) -> Result<Option<CarpoolPlan>, OptimizeError> {
        Ok(self
            .optimize(event_id, requesting_user_id, self.config.max_results)?
            .into_iter()
            .next())
    }

    /// Users with an attended record for the event, restricted to the known
    /// user set, read through the attendee cache.
    fn attending_users(
        &self,
        event_id: EventId,
        attendance: &[AttendanceRecord],
    ) -> Result<Vec<User>, OptimizeError> {
        let key = attendee_key(event_id);
        if let Some(cached) = self.caches.attendees(&key) {
            return Ok(cached);
        }

        let attended: HashSet<UserId> = attendance
            .iter()
            .filter(|record| record.attended)
            .map(|record| record.user_id)
            .collect();
        let users: Vec<User> = self
            .store
            .list_users()?
            .into_iter()
            .filter(|user| attended.contains(&user.id))
            .collect();

        self.caches.store_attendees(key, users.clone());
        Ok(users)
    }

    /// Route for (driver, riders, event) through the route cache. Missing
    /// driver or event coordinates short-circuit to the unreachable
    /// sentinel without a cache entry or provider call.
    fn fetch_route(&self, driver: &User, riders: &[User], event: &Event) -> RouteResult {
        let (Some(origin), Some(destination)) = (driver.coordinate, event.coordinate) else {
            return RouteResult::unreachable();
        };

        let key = route_key(driver, riders, event);
        if let Some(cached) = self.caches.route(&key) {
            return cached;
        }

        let mut waypoints = Vec::with_capacity(riders.len() + 2);
        waypoints.push(origin);
        waypoints.extend(riders.iter().filter_map(|rider| rider.coordinate));
        waypoints.push(destination);

        let result = self.router.route(&waypoints);
        self.caches.store_route(key, result.clone());
        result
    }
}
