//! Bounded in-memory bitmap caches

use app_cache::CacheKey;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

const FALLBACK_CAPACITY: usize = 256;

/// Thread-safe LRU cache for decoded bitmaps, keyed by [`CacheKey`].
///
/// `get` refreshes recency; `put` evicts the strictly least-recently-used
/// entry once capacity is exceeded. The engine owns two independent
/// instances (full-resolution sources and render-ready thumbnails) with
/// independent lifetimes: evicting from one never touches the other.
pub struct BitmapCache<T> {
    inner: Mutex<LruCache<CacheKey, Arc<T>>>,
}

impl<T> BitmapCache<T> {
    /// Create a cache bounded to `capacity` entries
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(FALLBACK_CAPACITY).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Look up a bitmap, marking it most recently used on a hit
    pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        self.inner.lock().get(key).cloned()
    }

    /// Insert a bitmap, evicting the least-recently-used entry if full
    pub fn put(&self, key: CacheKey, value: Arc<T>) {
        self.inner.lock().put(key, value);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
