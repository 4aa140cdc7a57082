//! Recommendation Engine - content-based nearest neighbours
//!
//! Looks up a movie's row in the precomputed similarity matrix and returns
//! the movies with the highest scores in that row.
//!
//! ## Algorithm
//! 1. Resolve the title to a row index
//! 2. Borrow that row of the similarity matrix
//! 3. Rank every other column by score descending, ties by ascending row
//! 4. Keep the first `count` (at most N - 1)
//! 5. Map rows back to titles and scale scores to percentages
//!
//! Step 3 uses a partial selection (`select_nth_unstable_by`) and only
//! sorts the winners, so a query costs O(N + k log k).

use crate::error::{RecommendError, Result};
use crate::traits::Recommender;
use crate::types::Recommendation;
use data_loader::{Catalog, Dataset, RowIndex, SimilarityMatrix};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Stateless lookup over an immutable catalog and matrix.
///
/// Cloning is cheap: both parts are behind `Arc`.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
    matrix: Arc<SimilarityMatrix>,
}

impl RecommendationEngine {
    /// Create an engine from a validated dataset
    pub fn new(dataset: Dataset) -> Self {
        let (catalog, matrix) = dataset.into_parts();
        Self {
            catalog: Arc::new(catalog),
            matrix: Arc::new(matrix),
        }
    }

    /// Create an engine from parts that were never checked against each other.
    ///
    /// A size mismatch is not rejected here; it surfaces as
    /// `RecommendError::Integrity` when a query touches it.
    pub fn from_parts(catalog: Arc<Catalog>, matrix: Arc<SimilarityMatrix>) -> Self {
        Self { catalog, matrix }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Movies most similar to `title`, best first.
    ///
    /// Returns `min(count, N - 1)` entries and never the queried movie itself.
    #[instrument(skip(self), level = "debug")]
    pub fn recommend(&self, title: &str, count: usize) -> Result<Vec<Recommendation>> {
        if count == 0 {
            return Err(RecommendError::InvalidArgument(
                "count must be at least 1".to_string(),
            ));
        }

        let index = self
            .catalog
            .lookup_index(title)
            .ok_or_else(|| RecommendError::NotFound(title.to_string()))?;

        let row = self
            .matrix
            .row(index)
            .map_err(|e| RecommendError::Integrity(e.to_string()))?;

        if row.len() != self.catalog.len() {
            return Err(RecommendError::Integrity(format!(
                "similarity row {} has {} columns but catalog has {} movies",
                index,
                row.len(),
                self.catalog.len()
            )));
        }

        let ranked = top_k(row, index, count);
        debug!("Selected {} neighbours for row {}", ranked.len(), index);

        ranked
            .into_iter()
            .map(|(neighbour, raw)| {
                let title = self.catalog.title_at(neighbour).ok_or_else(|| {
                    RecommendError::Integrity(format!("no catalog title for row {}", neighbour))
                })?;
                Ok(Recommendation {
                    title: title.to_string(),
                    similarity_score: percentage_score(raw),
                })
            })
            .collect()
    }
}

impl Recommender for RecommendationEngine {
    fn recommend(&self, title: &str, count: usize) -> Result<Vec<Recommendation>> {
        RecommendationEngine::recommend(self, title, count)
    }
}

/// Descending score, then ascending row index.
///
/// `total_cmp` makes this a total order, so the selection below is
/// deterministic no matter how the unstable algorithms shuffle.
fn by_rank(a: &(RowIndex, f32), b: &(RowIndex, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Best `k` (row, score) pairs from `row`, skipping column `exclude`
fn top_k(row: &[f32], exclude: RowIndex, k: usize) -> Vec<(RowIndex, f32)> {
    let mut candidates: Vec<(RowIndex, f32)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(j, _)| j != exclude)
        .collect();

    let k = k.min(candidates.len());
    if k == 0 {
        return Vec::new();
    }

    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, by_rank);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(by_rank);
    candidates
}

/// Raw similarity as a percentage with one decimal place.
///
/// No normalisation: a raw value outside [0, 1] gives a percentage
/// outside [0, 100].
pub fn percentage_score(raw: f32) -> f64 {
    (f64::from(raw) * 100.0 * 10.0).round() / 10.0
}
