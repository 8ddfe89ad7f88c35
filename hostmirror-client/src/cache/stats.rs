//! Cache usage counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of one table cache's usage counters.
///
/// Purely observational: the cache never changes behavior based on these.
/// A "hit" is a read served from an already-populated view; a "miss" is a
/// read that found its view unpopulated (whether first use or after an
/// invalidation).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a populated view.
    pub hits: u64,
    /// Reads that found their view unpopulated.
    pub misses: u64,
    /// Full-table fetches performed against the remote source.
    pub fetches: u64,
    /// Times the cache was invalidated.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Internal atomic counters backing [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    invalidations: AtomicU64,
}

impl StatCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}
