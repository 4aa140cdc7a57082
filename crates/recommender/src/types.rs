//! Values produced by the engine and cache.

use serde::Serialize;

/// How many recommendations to return when the caller doesn't say
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// How many distinct (title, count) keys the cache holds by default
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// One similar movie.
///
/// `similarity_score` is the raw matrix value times 100, rounded to one
/// decimal place (so 0.9 becomes 90.0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub similarity_score: f64,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of cached keys right now
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache (0.0 when unused)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
