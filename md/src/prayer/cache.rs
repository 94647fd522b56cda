//! Bounded-TTL cache for external lookups
//!
//! An explicit cache object owned by the daemon state and passed by
//! reference - never process-global. Created at startup, entries expire by
//! TTL, torn down with the process.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A string-keyed cache whose entries expire after a fixed TTL.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, (Instant, V)>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Fetch a live entry; expired entries are dropped on access.
    pub fn get(&mut self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            Some((inserted, value)) if inserted.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), (Instant::now(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("year-2026", vec![1, 2, 3]);

        assert_eq!(cache.get("year-2026"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get("year-2027"), None);
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let mut cache = TtlCache::new(Duration::from_millis(10));
        cache.insert("k", 1u8);

        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reinsert_refreshes() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", 1u8);
        cache.insert("k", 2u8);

        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }
}
