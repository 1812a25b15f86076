//! Bounded in-memory cache with LRU eviction and an optional TTL.
//!
//! Used for location translation memoization and enrichment responses.
//! Capacity is fixed at construction; inserting past it evicts the least
//! recently used entry.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted: Instant,
    last_used: u64,
}

#[derive(Debug)]
struct Inner<K, V> {
    map: HashMap<K, Entry<V>>,
    tick: u64,
}

#[derive(Debug)]
pub struct BoundedCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    cap: usize,
    ttl: Option<Duration>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(cap: usize) -> Self {
        Self::with_ttl(cap, None)
    }

    pub fn with_ttl(cap: usize, ttl: Option<Duration>) -> Self {
        let cap = cap.max(1);
        Self {
            inner: Mutex::new(Inner {
                map: HashMap::with_capacity(cap.min(4096)),
                tick: 0,
            }),
            cap,
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut g = self.inner.lock();
        g.tick += 1;
        let tick = g.tick;

        let expired = match g.map.get(key) {
            None => return None,
            Some(e) => self.ttl.is_some_and(|ttl| e.inserted.elapsed() > ttl),
        };
        if expired {
            g.map.remove(key);
            return None;
        }

        let e = g.map.get_mut(key)?;
        e.last_used = tick;
        Some(e.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let mut g = self.inner.lock();
        g.tick += 1;
        let tick = g.tick;

        if !g.map.contains_key(&key) && g.map.len() >= self.cap {
            let victim = g
                .map
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            if let Some(k) = victim {
                g.map.remove(&k);
            }
        }

        g.map.insert(
            key,
            Entry {
                value,
                inserted: Instant::now(),
                last_used: tick,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let c = BoundedCache::new(2);
        c.insert("a", 1);
        c.insert("b", 2);
        // touch "a" so "b" becomes the eviction candidate
        assert_eq!(c.get(&"a"), Some(1));
        c.insert("c", 3);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&"b"), None);
        assert_eq!(c.get(&"a"), Some(1));
        assert_eq!(c.get(&"c"), Some(3));
    }

    #[test]
    fn overwrite_does_not_evict() {
        let c = BoundedCache::new(2);
        c.insert("a", 1);
        c.insert("b", 2);
        c.insert("a", 10);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&"a"), Some(10));
        assert_eq!(c.get(&"b"), Some(2));
    }

    #[test]
    fn expired_entries_are_dropped() {
        let c = BoundedCache::with_ttl(4, Some(Duration::from_millis(10)));
        c.insert("k", "v");
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(c.get(&"k"), None);
        assert!(c.is_empty());
    }
}
