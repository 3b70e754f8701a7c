// Time-to-live memoization for loaded sheets
#[cfg(test)]
use parking_lot::Mutex;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

#[cfg(test)]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: Arc<V>,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Entries are immutable once stored; a refresh swaps in a new entry.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_fresh(&self, key: &K, now: Instant, ttl: Duration) -> Option<Arc<V>> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V, now: Instant) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.write().insert(
            key,
            CacheEntry {
                value: value.clone(),
                stored_at: now,
            },
        );
        value
    }

    /// Return the fresh value for `key`, or run `fetch` and store its result.
    /// Errors are handed back without touching the cache.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: K,
        now: Instant,
        ttl: Duration,
        fetch: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_fresh(&key, now, ttl) {
            return Ok(value);
        }

        let value = fetch().await?;
        Ok(self.insert(key, value, now))
    }

    pub fn purge_expired(&self, now: Instant, ttl: Duration) {
        self.entries.write().retain(|_, entry| entry.is_fresh(now, ttl));
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
