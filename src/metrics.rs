//! Resolution metrics.
//!
//! Counters for the runtime path: handler cache hits and misses, lookups
//! that found no backing resource, and bundles fabricated in memory. Each
//! resolver owns its own [`ResolutionMetrics`] so tests and embedded uses
//! get isolated counts; nothing here is process-global.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Counters updated concurrently by resolution calls.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    /// Resolutions answered from the handler cache.
    cache_hits: AtomicUsize,

    /// Resolutions that had to construct a handler.
    cache_misses: AtomicUsize,

    /// Lookups where no candidate resource existed.
    missing_bundles: AtomicUsize,

    /// Bundles fabricated from contract literals.
    fabricated_bundles: AtomicUsize,
}

impl ResolutionMetrics {
    pub fn new() -> ResolutionMetrics {
        ResolutionMetrics::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing_bundle(&self) {
        self.missing_bundles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fabrication(&self) {
        self.fabricated_bundles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn missing_bundles(&self) -> usize {
        self.missing_bundles.load(Ordering::Relaxed)
    }

    pub fn fabricated_bundles(&self) -> usize {
        self.fabricated_bundles.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total = hits + misses;
        let cache_hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            missing_bundles: self.missing_bundles(),
            fabricated_bundles: self.fabricated_bundles(),
        }
    }
}

/// Serializable counter snapshot embedded in resolver stats.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub missing_bundles: usize,
    pub fabricated_bundles: usize,
}
