//! Cache statistics
//!
//! Tracks lookup outcomes so operators can distinguish a cold cache from a
//! down one: misses are normal, a climbing `unavailable` count is an
//! outage in the backing store even though requests keep succeeding.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Atomic counters shared by every cache manager clone.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    unavailable: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the backend-unavailable counter.
    pub fn record_unavailable(&self) {
        self.unavailable.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the namespace-invalidation counter.
    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time snapshot of the counters.
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        CacheStatsSnapshot {
            hits,
            misses,
            unavailable: self.unavailable.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            hit_rate: hit_rate(hits, misses),
        }
    }
}

/// Calculates hits / (hits + misses), or 0.0 with no lookups.
fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

// == Snapshot ==
/// Serializable view of the counters for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through to storage
    pub misses: u64,
    /// Lookups (or writes) that found the backend unreachable
    pub unavailable: u64,
    /// Namespace invalidations issued
    pub invalidations: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}
