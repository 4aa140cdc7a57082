//! # Recommender Crate
//!
//! Content-based movie recommendations from a precomputed similarity matrix.
//!
//! ## Components
//!
//! ### RecommendationEngine
//! Pure lookup: title -> the N most similar other titles, scored as
//! percentages. Deterministic for a fixed dataset.
//!
//! ### RecommendationCache
//! Bounded LRU memoization in front of any `Recommender`, keyed by the exact
//! `(title, count)` pair. Thread-safe, with at most one concurrent compute
//! per key. Tracks hits, misses and size; can be cleared at runtime.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use recommender::{RecommendationCache, RecommendationEngine};
//! use std::sync::Arc;
//!
//! let dataset = Dataset::load_from_dir(Path::new("data"))?;
//! let engine = Arc::new(RecommendationEngine::new(dataset));
//! let cache = RecommendationCache::with_default_capacity(engine.clone());
//!
//! for rec in cache.get("Avatar", 5)?.iter() {
//!     println!("{} ({:.1}%)", rec.title, rec.similarity_score);
//! }
//! println!("{:?}", cache.stats());
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod traits;
pub mod types;

pub use cache::{RecommendationCache, SharedRecommendations};
pub use engine::{RecommendationEngine, percentage_score};
pub use error::{RecommendError, Result};
pub use traits::Recommender;
pub use types::{CacheStats, DEFAULT_CACHE_CAPACITY, DEFAULT_RECOMMENDATIONS, Recommendation};
