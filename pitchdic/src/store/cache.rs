//! Per-store memoization of lookup results.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;

/// Hit and miss counters of a [`LookupCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: usize,

    /// Lookups that computed their result.
    pub misses: usize,

    /// Number of cached query strings.
    pub len: usize,
}

/// Results keyed by the exact query string, including empty results.
///
/// Entries are never evicted.
pub(crate) struct LookupCache<V> {
    map: Mutex<HashMap<String, V>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<V> Default for LookupCache<V> {
    fn default() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }
}

impl<V> LookupCache<V>
where
    V: Clone,
{
    /// Gets the cached result of `key`, computing it with `f` on a miss.
    ///
    /// `f` runs without holding the lock. When two threads miss on the same
    /// key, the first stored result wins.
    pub fn get_or_insert_with<F>(&self, key: &str, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.lock().get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = f();
        self.lock()
            .entry(key.to_string())
            .or_insert(value)
            .clone()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.lock().len(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, V>> {
        // A panic inside `f` never leaves a half-written entry.
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
