//! TTL caches for routing fan-out and deterministic key fingerprints.
//!
//! One optimization run fans out into many distance and directions lookups
//! over the same handful of users, so results are cached by a structural
//! fingerprint of their arguments. Expiry is lazy: `get` ignores stale
//! entries but does not remove them; callers trigger `sweep` explicitly
//! (or implicitly on writes once a cache grows past the sweep threshold).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::geo::Coordinate;
use crate::model::{Event, EventId, User};
use crate::routing::RouteResult;

/// Default entry lifetime: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Entry count above which writes trigger a sweep of expired entries.
pub const SWEEP_THRESHOLD: usize = 1000;

const KEY_SEPARATOR: &str = "|";

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// A string-keyed cache whose entries expire after a fixed TTL.
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Lookup with an explicit clock, for deterministic expiry tests.
    /// Expired entries are skipped but not removed (lazy eviction).
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        if now.duration_since(entry.inserted_at) > self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.set_at(key, value, Instant::now());
    }

    pub fn set_at(&mut self, key: impl Into<String>, value: V, now: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Remove every entry older than the TTL.
    pub fn sweep(&mut self) {
        self.sweep_at(Instant::now());
    }

    pub fn sweep_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) <= ttl);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn needs_sweep(&self) -> bool {
        self.entries.len() > SWEEP_THRESHOLD
    }
}

// ---------------------------------------------------------------------------
// Key fingerprints
// ---------------------------------------------------------------------------

fn coordinate_part(coordinate: Option<&Coordinate>) -> String {
    serde_json::to_string(&coordinate).unwrap_or_else(|_| "null".to_string())
}

/// Fingerprint for a pairwise distance. Order-insensitive: the two coordinate
/// parts are sorted so `(a, b)` and `(b, a)` share one entry.
pub fn distance_key(a: &User, b: &User) -> String {
    let mut parts = [
        coordinate_part(a.coordinate.as_ref()),
        coordinate_part(b.coordinate.as_ref()),
    ];
    parts.sort();
    parts.join(KEY_SEPARATOR)
}

/// Fingerprint for a full route request: driver origin, the passenger
/// pickups (sorted, so structurally equal queries collide regardless of
/// pickup order), and the event id.
pub fn route_key(driver: &User, passengers: &[User], event: &Event) -> String {
    let mut passenger_parts: Vec<String> = passengers
        .iter()
        .map(|p| coordinate_part(p.coordinate.as_ref()))
        .collect();
    passenger_parts.sort();

    let mut parts = vec![coordinate_part(driver.coordinate.as_ref())];
    parts.extend(passenger_parts);
    parts.push(event.id.to_string());
    parts.join(KEY_SEPARATOR)
}

/// Fingerprint for an event's attending-user list.
pub fn attendee_key(event_id: EventId) -> String {
    event_id.to_string()
}

// ---------------------------------------------------------------------------
// Cache bundle
// ---------------------------------------------------------------------------

/// The three caches an optimization run reads through, guarded for use from
/// concurrent request handlers. A poisoned lock falls back to uncached
/// behavior rather than propagating the panic.
pub struct CarpoolCaches {
    route: Mutex<TtlCache<RouteResult>>,
    distance: Mutex<TtlCache<f64>>,
    attendees: Mutex<TtlCache<Vec<User>>>,
}

impl CarpoolCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            route: Mutex::new(TtlCache::new(ttl)),
            distance: Mutex::new(TtlCache::new(ttl)),
            attendees: Mutex::new(TtlCache::new(ttl)),
        }
    }

    pub fn route(&self, key: &str) -> Option<RouteResult> {
        match self.route.lock() {
            Ok(cache) => cache.get(key),
            Err(_) => None,
        }
    }

    pub fn store_route(&self, key: impl Into<String>, value: RouteResult) {
        if let Ok(mut cache) = self.route.lock() {
            if cache.needs_sweep() {
                cache.sweep();
            }
            cache.set(key, value);
        }
    }

    pub fn distance(&self, key: &str) -> Option<f64> {
        match self.distance.lock() {
            Ok(cache) => cache.get(key),
            Err(_) => None,
        }
    }

    pub fn store_distance(&self, key: impl Into<String>, value: f64) {
        if let Ok(mut cache) = self.distance.lock() {
            if cache.needs_sweep() {
                cache.sweep();
            }
            cache.set(key, value);
        }
    }

    pub fn attendees(&self, key: &str) -> Option<Vec<User>> {
        match self.attendees.lock() {
            Ok(cache) => cache.get(key),
            Err(_) => None,
        }
    }

    pub fn store_attendees(&self, key: impl Into<String>, value: Vec<User>) {
        if let Ok(mut cache) = self.attendees.lock() {
            if cache.needs_sweep() {
                cache.sweep();
            }
            cache.set(key, value);
        }
    }

    /// Drop every entry in every cache.
    pub fn clear_all(&self) {
        for cleared in [
            self.route.lock().map(|mut c| c.clear()).is_ok(),
            self.distance.lock().map(|mut c| c.clear()).is_ok(),
            self.attendees.lock().map(|mut c| c.clear()).is_ok(),
        ] {
            debug_assert!(cleared, "cache lock poisoned during clear");
        }
    }

    /// Remove expired entries from every cache.
    pub fn sweep_all(&self) {
        if let Ok(mut cache) = self.route.lock() {
            cache.sweep();
        }
        if let Ok(mut cache) = self.distance.lock() {
            cache.sweep();
        }
        if let Ok(mut cache) = self.attendees.lock() {
            cache.sweep();
        }
    }
}

impl Default for CarpoolCaches {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;

    fn user(id: u64, lat: f64, lng: f64) -> User {
        User::new(id, format!("user{}", id), Some(Coordinate::new(lat, lng)))
    }

    #[test]
    fn entry_expires_after_ttl() {
        let ttl = Duration::from_secs(60);
        let mut cache = TtlCache::new(ttl);
        let t0 = Instant::now();
        cache.set_at("k", 42.0, t0);

        let just_before = t0 + ttl - Duration::from_millis(1);
        let just_after = t0 + ttl + Duration::from_millis(1);
        assert_eq!(cache.get_at("k", just_before), Some(42.0));
        assert_eq!(cache.get_at("k", just_after), None);
        // Lazy eviction: the stale entry is still resident until a sweep.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let ttl = Duration::from_secs(60);
        let mut cache = TtlCache::new(ttl);
        let t0 = Instant::now();
        cache.set_at("old", 1.0, t0);
        cache.set_at("fresh", 2.0, t0 + Duration::from_secs(90));

        cache.sweep_at(t0 + Duration::from_secs(100));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at("fresh", t0 + Duration::from_secs(100)), Some(2.0));
    }

    #[test]
    fn set_overwrites_and_refreshes_timestamp() {
        let ttl = Duration::from_secs(60);
        let mut cache = TtlCache::new(ttl);
        let t0 = Instant::now();
        cache.set_at("k", 1.0, t0);
        cache.set_at("k", 2.0, t0 + Duration::from_secs(50));

        // Old timestamp would have expired here; the rewrite reset it.
        let t = t0 + Duration::from_secs(90);
        assert_eq!(cache.get_at("k", t), Some(2.0));
    }

    #[test]
    fn distance_key_is_order_insensitive() {
        let a = user(1, 37.77, -122.41);
        let b = user(2, 37.80, -122.27);
        assert_eq!(distance_key(&a, &b), distance_key(&b, &a));
    }

    #[test]
    fn structurally_equal_queries_share_a_key() {
        let a1 = user(1, 37.77, -122.41);
        let a2 = user(1, 37.77, -122.41);
        let b = user(2, 37.80, -122.27);
        assert_eq!(distance_key(&a1, &b), distance_key(&a2, &b));
    }

    #[test]
    fn route_key_ignores_passenger_order() {
        let driver = user(1, 37.77, -122.41);
        let p1 = user(2, 37.78, -122.40);
        let p2 = user(3, 37.79, -122.39);
        let event = Event {
            id: 9,
            title: "Picnic".to_string(),
            coordinate: Some(Coordinate::new(37.80, -122.27)),
            creator_id: 1,
            is_public: true,
        };

        let forward = route_key(&driver, &[p1.clone(), p2.clone()], &event);
        let reversed = route_key(&driver, &[p2, p1], &event);
        assert_eq!(forward, reversed);
        assert!(forward.ends_with("|9"));
    }

    #[test]
    fn clear_all_empties_every_cache() {
        let caches = CarpoolCaches::new(Duration::from_secs(60));
        caches.store_distance("d", 1.0);
        caches.store_route("r", crate::routing::RouteResult::unreachable());
        caches.store_attendees("a", vec![user(1, 0.0, 0.0)]);

        caches.clear_all();
        assert!(caches.distance("d").is_none());
        assert!(caches.route("r").is_none());
        assert!(caches.attendees("a").is_none());
    }
}
