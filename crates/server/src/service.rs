//! # Recommendation Service
//!
//! The one object request handlers talk to. It owns:
//! 1. The recommendation engine (catalog + similarity matrix)
//! 2. The process-wide recommendation cache in front of it
//! 3. The sorted title listing, computed once at startup
//!
//! Construct it once in the entry point and share it behind an `Arc`.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use data_loader::Dataset;
use recommender::{CacheStats, RecommendationCache, RecommendationEngine, SharedRecommendations};

pub struct RecommendationService {
    engine: Arc<RecommendationEngine>,
    cache: RecommendationCache,
    sorted_titles: Vec<String>,
}

impl RecommendationService {
    /// Wrap an engine with a cache of `cache_capacity` keys
    pub fn new(engine: Arc<RecommendationEngine>, cache_capacity: usize) -> Self {
        let sorted_titles = engine.catalog().sorted_titles();
        let cache = RecommendationCache::new(engine.clone(), cache_capacity);
        Self {
            engine,
            cache,
            sorted_titles,
        }
    }

    /// Load the dataset from `data_dir` and build the service.
    ///
    /// Any load failure is returned with context; callers should treat it as
    /// fatal and not start serving.
    pub fn load(data_dir: &Path, cache_capacity: usize) -> Result<Self> {
        let start = Instant::now();
        let dataset = Dataset::load_from_dir(data_dir)
            .with_context(|| format!("Failed to load dataset from {}", data_dir.display()))?;
        let service = Self::new(Arc::new(RecommendationEngine::new(dataset)), cache_capacity);
        info!(
            "Recommendation service ready: {} movies, cache capacity {}, {:.2?}",
            service.movie_count(),
            service.cache.capacity(),
            start.elapsed()
        );
        Ok(service)
    }

    /// Recommendations for `title`, served from the cache when possible
    pub fn recommend_cached(
        &self,
        title: &str,
        count: usize,
    ) -> recommender::Result<SharedRecommendations> {
        self.cache.get(title, count)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Empty the cache; returns the (zeroed) post-clear counters
    pub fn cache_clear(&self) -> CacheStats {
        let stats = self.cache.clear();
        info!("Recommendation cache cleared");
        stats
    }

    /// Every title, sorted lexicographically
    pub fn list_titles(&self) -> &[String] {
        &self.sorted_titles
    }

    pub fn movie_count(&self) -> usize {
        self.engine.catalog().len()
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }
}
