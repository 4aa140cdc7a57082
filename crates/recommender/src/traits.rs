//! Core trait for anything the cache can sit in front of.

use crate::error::Result;
use crate::types::Recommendation;

/// Computes recommendations for a title.
///
/// ## Design Note
/// - `Send + Sync` so one instance can serve every request thread
/// - Implementations must be deterministic for a given (title, count):
///   the cache assumes a stored result is as good as a fresh one
pub trait Recommender: Send + Sync {
    /// Up to `count` movies most similar to `title`, best first
    fn recommend(&self, title: &str, count: usize) -> Result<Vec<Recommendation>>;
}
