//! Shared single-flight LRU cache.
//!
//! Both the change-kind cache and the file-diff cache sit in front of
//! expensive repository computations that many concurrent requests may need
//! for the same key. The cache guarantees at most one in-flight computation
//! per key: concurrent requesters for the same key await the same cell and
//! receive the same value.
//!
//! Failed computations are not cached. A later request for the same key
//! attempts the computation again; the inference engine itself never
//! retries.

use lru::LruCache;
use parking_lot::Mutex;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Configuration for a kernel cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
    /// Whether to enable the cache.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            enabled: true,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
}

/// LRU cache with single-flight population.
///
/// Each slot is a `OnceCell` shared by every requester of that key, so the
/// init future runs at most once per resident key. If an entry is evicted
/// while a computation is in flight, requesters already holding the cell
/// still share its result; at worst a fresh requester recomputes.
pub struct SingleFlightCache<K: Hash + Eq, V: Clone> {
    inner: Option<Mutex<LruCache<K, Arc<OnceCell<V>>>>>,
}

impl<K: Hash + Eq + Clone, V: Clone> SingleFlightCache<K, V> {
    /// Create a cache from a configuration.
    pub fn new(config: CacheConfig) -> Self {
        let inner = if config.enabled {
            let size = NonZeroUsize::new(config.max_entries)
                .unwrap_or_else(|| NonZeroUsize::new(1000).expect("nonzero"));
            Some(Mutex::new(LruCache::new(size)))
        } else {
            None
        };
        Self { inner }
    }

    /// Get the cached value for `key`, or compute it with `init`.
    ///
    /// Errors are returned to the caller and evict the slot, so a failed
    /// key neither occupies capacity nor shows up in [`stats`].
    ///
    /// [`stats`]: Self::stats
    pub async fn get_or_try_init<E, F, Fut>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let Some(inner) = &self.inner else {
            return init().await;
        };

        let cell = {
            let mut cache = inner.lock();
            cache
                .get_or_insert(key.clone(), || Arc::new(OnceCell::new()))
                .clone()
        };

        match cell.get_or_try_init(init).await {
            Ok(value) => Ok(value.clone()),
            Err(e) => {
                let mut cache = inner.lock();
                // Evict only our still-unpopulated cell: a concurrent
                // retry may have populated it or replaced the slot.
                if cell.get().is_none()
                    && cache.peek(&key).is_some_and(|slot| Arc::ptr_eq(slot, &cell))
                {
                    cache.pop(&key);
                }
                Err(e)
            }
        }
    }

    /// Get cache statistics.
    ///
    /// Returns `None` if caching is disabled.
    pub fn stats(&self) -> Option<CacheStats> {
        self.inner.as_ref().map(|inner| {
            let cache = inner.lock();
            CacheStats {
                len: cache.len(),
                cap: cache.cap().get(),
            }
        })
    }

    /// Clear the cache. Does nothing if caching is disabled.
    pub fn clear(&self) {
        if let Some(inner) = &self.inner {
            inner.lock().clear();
        }
    }
}
