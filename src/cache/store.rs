/*!
 * In-memory TTL key/value store.
 *
 * Entries expire lazily: a read checks the entry's deadline before returning
 * it, so an expired entry is never served even if the background sweep has
 * not run yet. The sweep (`spawn_sweeper`) only removes entries.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::app_config::CacheConfig;

/// Approximate in-memory size of a cached value, for `stats()`
pub trait CacheSize {
    fn approximate_size(&self) -> usize;
}

impl CacheSize for String {
    fn approximate_size(&self) -> usize {
        self.len()
    }
}

impl CacheSize for serde_json::Value {
    fn approximate_size(&self) -> usize {
        serde_json::to_string(self).map(|s| s.len()).unwrap_or(0)
    }
}

impl<T: CacheSize> CacheSize for Vec<T> {
    fn approximate_size(&self) -> usize {
        self.iter().map(CacheSize::approximate_size).sum()
    }
}

/// Mutation hooks, invoked synchronously after the store lock is released
pub trait CacheObserver: Send + Sync {
    fn on_set(&self, _key: &str, _ttl: Duration) {}
    fn on_delete(&self, _key: &str) {}
    fn on_expire(&self, _key: &str) {}
    fn on_clear(&self, _removed: usize) {}
}

/// Observer that writes every mutation to the debug log
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl CacheObserver for LoggingObserver {
    fn on_set(&self, key: &str, ttl: Duration) {
        debug!("Cache SET: {} (TTL: {}s)", key, ttl.as_secs());
    }

    fn on_delete(&self, key: &str) {
        debug!("Cache DEL: {}", key);
    }

    fn on_expire(&self, key: &str) {
        debug!("Cache EXPIRED: {}", key);
    }

    fn on_clear(&self, removed: usize) {
        debug!("Cache cleared ({} entries)", removed);
    }
}

/// Snapshot of store counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    /// Live entries currently held
    pub keys: usize,
    /// Cumulative hits since creation or last clear
    pub hits: u64,
    /// Cumulative misses since creation or last clear
    pub misses: u64,
    /// Total bytes of stored keys
    pub ksize: usize,
    /// Approximate total bytes of stored values
    pub vsize: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
    size: usize,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    hits: u64,
    misses: u64,
    ksize: usize,
    vsize: usize,
}

impl<V> Inner<V> {
    fn remove(&mut self, key: &str) -> Option<Entry<V>> {
        let entry = self.entries.remove(key)?;
        self.ksize -= key.len();
        self.vsize -= entry.size;
        Some(entry)
    }

    fn drain_expired(&mut self, now: Instant) -> Vec<String> {
        let expired: Vec<String> = self.entries.iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        expired
    }
}

/// TTL cache shared by clones
pub struct CacheStore<V> {
    inner: Arc<Mutex<Inner<V>>>,
    config: CacheConfig,
    observers: Arc<Vec<Arc<dyn CacheObserver>>>,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: self.config.clone(),
            observers: self.observers.clone(),
        }
    }
}

impl<V: Clone + CacheSize + Send + 'static> CacheStore<V> {
    /// Create a store with the logging observer
    pub fn new(config: CacheConfig) -> Self {
        Self::with_observers(config, vec![Arc::new(LoggingObserver)])
    }

    /// Create a store with an explicit observer list
    pub fn with_observers(config: CacheConfig, observers: Vec<Arc<dyn CacheObserver>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
                ksize: 0,
                vsize: 0,
            })),
            config,
            observers: Arc::new(observers),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Look up a live entry
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.config.enabled {
            return None;
        }

        let now = Instant::now();
        let (value, expired) = {
            let mut inner = self.inner.lock();
            let expired = inner.entries.get(key).is_some_and(|e| e.is_expired(now));
            if expired {
                inner.remove(key);
            }
            let value = inner.entries.get(key).map(|e| e.value.clone());
            if value.is_some() {
                inner.hits += 1;
            } else {
                inner.misses += 1;
            }
            (value, expired)
        };

        if expired {
            self.notify(|o| o.on_expire(key));
        }
        if value.is_some() {
            debug!("Cache HIT: {}", key);
        } else {
            debug!("Cache MISS: {}", key);
        }
        value
    }

    /// Whether a live entry exists, without touching hit/miss counters
    pub fn has(&self, key: &str) -> bool {
        self.config.enabled
            && self.inner.lock().entries.get(key).is_some_and(|e| !e.is_expired(Instant::now()))
    }

    /// Store a value for `ttl_secs` seconds (0 selects the configured default)
    ///
    /// Returns false when the store is disabled or full. A full store is one
    /// holding `max_keys` live entries; expired entries are dropped first,
    /// live entries are never evicted. Overwriting an existing key always
    /// succeeds.
    pub fn set(&self, key: &str, value: V, ttl_secs: u64) -> bool {
        if !self.config.enabled {
            return false;
        }

        let ttl = Duration::from_secs(if ttl_secs == 0 { self.config.default_ttl_secs } else { ttl_secs });
        let now = Instant::now();
        let size = value.approximate_size();

        let (stored, expired) = {
            let mut inner = self.inner.lock();
            let mut expired = Vec::new();
            let is_new = !inner.entries.contains_key(key);

            if is_new && self.config.max_keys > 0 && inner.entries.len() >= self.config.max_keys {
                expired = inner.drain_expired(now);
            }

            let full = is_new && self.config.max_keys > 0 && inner.entries.len() >= self.config.max_keys;
            if !full {
                inner.remove(key);
                inner.ksize += key.len();
                inner.vsize += size;
                inner.entries.insert(key.to_string(), Entry {
                    value,
                    expires_at: expiry_deadline(now, ttl),
                    size,
                });
            }
            (!full, expired)
        };

        for expired_key in &expired {
            self.notify(|o| o.on_expire(expired_key));
        }

        if stored {
            self.notify(|o| o.on_set(key, ttl));
        } else {
            warn!("Cache SET failed: {} (max keys {} reached)", key, self.config.max_keys);
        }
        stored
    }

    /// Remove one entry, returning the number removed
    pub fn del(&self, key: &str) -> usize {
        if !self.config.enabled {
            return 0;
        }

        let removed = self.inner.lock().remove(key).is_some();
        if removed {
            self.notify(|o| o.on_delete(key));
            1
        } else {
            0
        }
    }

    /// Remove every entry and reset counters
    pub fn clear(&self) {
        let removed = {
            let mut inner = self.inner.lock();
            let removed = inner.entries.len();
            inner.entries.clear();
            inner.hits = 0;
            inner.misses = 0;
            inner.ksize = 0;
            inner.vsize = 0;
            removed
        };
        self.notify(|o| o.on_clear(removed));
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            keys: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            ksize: inner.ksize,
            vsize: inner.vsize,
        }
    }

    /// Keys of all stored entries, including ones awaiting the sweep
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Remove every expired entry now, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let expired = self.inner.lock().drain_expired(Instant::now());
        for key in &expired {
            self.notify(|o| o.on_expire(key));
        }
        expired.len()
    }

    /// Start the periodic expiry sweep on the current tokio runtime
    ///
    /// Returns `None` when the store is disabled or the check period is 0.
    /// The sweep stops when the returned handle is dropped.
    pub fn spawn_sweeper(&self) -> Option<SweeperHandle> {
        if !self.config.enabled || self.config.check_period_secs == 0 {
            return None;
        }

        let store = self.clone();
        let period = Duration::from_secs(self.config.check_period_secs);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!("Cache sweep removed {} expired entries", removed);
                }
            }
        });

        Some(SweeperHandle { task })
    }

    fn notify<F: Fn(&dyn CacheObserver)>(&self, f: F) {
        for observer in self.observers.iter() {
            f(observer.as_ref());
        }
    }
}

/// Deadline for a TTL, saturating at roughly a century when `now + ttl` overflows
fn expiry_deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(MAX_TTL))
        .unwrap_or(now)
}

const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Owns the background sweep task
#[derive(Debug)]
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
