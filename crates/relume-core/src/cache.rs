//! Bounded LRU cache of enhancement results.
//!
//! Keyed by (source URL, priority) — the same URL enhanced at different
//! priorities is cached separately, matching how requests are looked up.
//! Entries are valid until evicted by capacity or an explicit clear; there
//! is no time-based expiry.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::types::{EnhancedImage, Priority};

/// Cache key for an enhancement result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source_url: String,
    pub priority: Priority,
}

impl CacheKey {
    pub fn new(source_url: impl Into<String>, priority: Priority) -> Self {
        Self {
            source_url: source_url.into(),
            priority,
        }
    }
}

/// Capacity-bounded store of completed enhancement handles.
///
/// Only ever written by the orchestrator's drain loop; stores fully
/// processed output, never a raster mid-filter.
pub struct ResultCache {
    inner: LruCache<CacheKey, Arc<EnhancedImage>>,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` entries. A zero capacity
    /// is clamped to one so inserts always succeed.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(capacity),
        }
    }

    /// Look up a result, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<EnhancedImage>> {
        self.inner.get(key).cloned()
    }

    /// Store a completed result, evicting the least-recently-used entry if
    /// the cache is full.
    pub fn insert(&mut self, key: CacheKey, image: Arc<EnhancedImage>) {
        self.inner.put(key, image);
    }

    /// Drop every cached handle. In-flight jobs are unaffected; their
    /// results are inserted after the clear.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }
}
