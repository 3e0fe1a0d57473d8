//! Bounded in-memory response cache backed by `DashMap`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::CacheConfig;

/// A single cached value with its expiration time and recency stamp.
struct CacheEntry {
    value: String,
    expires_at: Instant,
    last_used: u64,
}

/// In-memory cache with time-to-live expiration and LRU eviction.
///
/// Values are serialized JSON strings, so any response shape (including a
/// `null` for a lookup that found nothing) is stored the same way. Expired
/// entries are lazily evicted on `get`, and before any LRU eviction when the
/// cache is full. A disabled cache stores nothing and never hits.
pub struct ResponseCache {
    store: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
    enabled: bool,
    clock: AtomicU64,
}

impl ResponseCache {
    /// Creates an enabled cache.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
            max_entries,
            enabled: true,
            clock: AtomicU64::new(0),
        }
    }

    /// Creates a cache that stores nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(Duration::ZERO, 0)
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::new(config.ttl, config.max_entries)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.max_entries > 0
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the cached value for `key`, or `None` if missing or expired.
    pub fn get(&self, key: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let now = Instant::now();
        {
            let mut entry = self.store.get_mut(key)?;
            if now < entry.expires_at {
                entry.last_used = self.tick();
                return Some(entry.value.clone());
            }
        }
        self.remove_expired(key, now);
        None
    }

    /// Removes `key` only if its entry has expired by `now`. An entry
    /// refreshed since the caller looked is kept.
    fn remove_expired(&self, key: &str, now: Instant) -> bool {
        self.store
            .remove_if(key, |_, entry| entry.expires_at <= now)
            .is_some()
    }

    /// Inserts or overwrites an entry, evicting to stay within capacity.
    pub fn set(&self, key: String, value: String) {
        if !self.is_enabled() {
            return;
        }
        if !self.store.contains_key(&key) && self.store.len() >= self.max_entries {
            self.evict();
        }
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
            last_used: self.tick(),
        };
        self.store.insert(key, entry);
    }

    /// Removes all entries from the cache.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Number of stored entries, including any not yet lazily expired.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn evict(&self) {
        let now = Instant::now();
        self.store.retain(|_, entry| entry.expires_at > now);
        while self.store.len() >= self.max_entries {
            let oldest = self
                .store
                .iter()
                .min_by_key(|entry| entry.last_used)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    tracing::debug!("Evicting least recently used cache entry {}", key);
                    self.store.remove(&key);
                }
                None => break,
            }
        }
    }
}
