//! Age-bounded in-memory cache.
//!
//! Entries are fresh while `now - stored_at < ttl`. Nothing sweeps them:
//! a stale entry reads as absent and is overwritten by the next insert.

use parking_lot::Mutex;
use std::{
    borrow::Borrow,
    collections::HashMap,
    hash::Hash,
    time::{Duration, Instant},
};

/// Source of "now" for cache freshness.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock used outside tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The value stored under `key`, if it is still fresh at `now`.
    pub fn get<Q>(&self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        (now.saturating_duration_since(entry.stored_at) < self.ttl).then(|| entry.value.clone())
    }

    /// Store `value`, replacing whatever was there.
    pub fn insert(&self, key: K, value: V, now: Instant) {
        self.entries.lock().insert(
            key,
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    /// Number of stored entries, stale ones included.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// Clock that only moves when told to.
    pub(crate) struct ManualClock(Mutex<Instant>);

    impl ManualClock {
        pub fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Instant::now())))
        }

        pub fn advance(&self, by: Duration) {
            *self.0.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock()
        }
    }

    const TTL: Duration = Duration::from_secs(300);
    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fresh_until_ttl() {
        let cache = TtlCache::new(TTL);
        let t = Instant::now();
        cache.insert("topic", 1, t);

        assert_eq!(cache.get("topic", t), Some(1));
        assert_eq!(cache.get("topic", t + TTL - MS), Some(1));
        assert_eq!(cache.get("topic", t + TTL), None);
        assert_eq!(cache.get("topic", t + TTL + MS), None);
    }

    #[test]
    fn test_stale_entry_overwritten() {
        let cache = TtlCache::new(TTL);
        let t = Instant::now();
        cache.insert("topic".to_string(), 1, t);
        cache.insert("topic".to_string(), 2, t + TTL + MS);

        assert_eq!(cache.get("topic", t + TTL + MS), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_key() {
        let cache: TtlCache<String, u8> = TtlCache::new(TTL);
        assert_eq!(cache.get("nope", Instant::now()), None);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance(TTL);
        assert_eq!(clock.now() - start, TTL);
    }
}
