//! Core domain types for the recommendation dataset.
//!
//! - `Catalog`: every movie title and its dense row position
//! - `SimilarityMatrix`: square item-item scores aligned to catalog rows
//! - `Dataset`: a catalog and matrix that have been checked against each other
//!
//! All three are built once at startup and never mutated afterwards, so they
//! can be shared across threads behind an `Arc` without any locking.

use crate::error::{DataLoadError, Result};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

// =============================================================================
// Type Aliases
// =============================================================================

/// Zero-based offset of a movie into the similarity matrix
pub type RowIndex = usize;

// =============================================================================
// Movie
// =============================================================================

/// A movie in the catalog.
///
/// The title is the external identifier; `row_index` is where its
/// similarities live in the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub row_index: RowIndex,
}

// =============================================================================
// Catalog
// =============================================================================

/// Immutable title <-> row index mapping.
///
/// Invariants (checked at construction):
/// - row indices are exactly `0..len()`
/// - titles are unique, so the mapping is a bijection
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Movies in row order; `movies[i].row_index == i`
    movies: Vec<Movie>,
    /// Title -> row lookup
    by_title: HashMap<String, RowIndex>,
}

impl Catalog {
    /// Build a catalog from titles given in row order.
    ///
    /// Fails with `DuplicateTitle` if any title repeats. Titles are taken
    /// as-is: no trimming or case-folding.
    pub fn from_titles<I, S>(titles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut movies = Vec::new();
        let mut by_title = HashMap::new();

        for (row_index, title) in titles.into_iter().enumerate() {
            let title = title.into();
            match by_title.entry(title.clone()) {
                Entry::Occupied(existing) => {
                    return Err(DataLoadError::DuplicateTitle {
                        title,
                        first: *existing.get(),
                        second: row_index,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(row_index);
                }
            }
            movies.push(Movie { title, row_index });
        }

        Ok(Self { movies, by_title })
    }

    /// Resolve a title to its row. Exact match only.
    pub fn lookup_index(&self, title: &str) -> Option<RowIndex> {
        self.by_title.get(title).copied()
    }

    /// Reverse lookup: row -> title
    pub fn title_at(&self, index: RowIndex) -> Option<&str> {
        self.movies.get(index).map(|m| m.title.as_str())
    }

    /// Get the full movie record for a row
    pub fn get_movie(&self, index: RowIndex) -> Option<&Movie> {
        self.movies.get(index)
    }

    /// All titles in row order
    pub fn all_titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|m| m.title.as_str())
    }

    /// All titles sorted lexicographically (for listing)
    pub fn sorted_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.movies.iter().map(|m| m.title.clone()).collect();
        titles.sort_unstable();
        titles
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

// =============================================================================
// SimilarityMatrix
// =============================================================================

/// Square N x N matrix of similarity scores, stored row-major in one buffer.
///
/// Cell `(i, j)` is how similar movie `i` is to movie `j`. Values are taken
/// as given: nothing requires them to lie in `[0, 1]` or the diagonal to be 1.
/// Non-finite values are rejected and negative zeros are stored as `0.0`
/// so that ranking stays well defined.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    dimension: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build from a flat row-major buffer of `dimension * dimension` values
    pub fn from_flat(dimension: usize, mut values: Vec<f32>) -> Result<Self> {
        let expected = dimension.checked_mul(dimension).ok_or_else(|| {
            DataLoadError::DimensionMismatch(format!("dimension {dimension} overflows"))
        })?;
        if values.len() != expected {
            return Err(DataLoadError::DimensionMismatch(format!(
                "expected {} cells for a {}x{} matrix, found {}",
                expected,
                dimension,
                dimension,
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataLoadError::InvalidValue {
                field: format!("similarity[{}][{}]", pos / dimension, pos % dimension),
                value: values[pos].to_string(),
            });
        }
        // -0.0 + 0.0 == +0.0, so equal zeros rank as ties
        values.iter_mut().for_each(|v| *v += 0.0);
        Ok(Self { dimension, values })
    }

    /// Build from individual rows. Every row must be as long as there are rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = rows.len();
        let mut values = Vec::with_capacity(dimension * dimension);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(DataLoadError::DimensionMismatch(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            values.extend(row);
        }
        Self::from_flat(dimension, values)
    }

    /// Borrow one row of the matrix
    ///
    /// Returns `RowOutOfBounds` rather than panicking for indices outside `[0, N)`.
    pub fn row(&self, index: RowIndex) -> Result<&[f32]> {
        if index >= self.dimension {
            return Err(DataLoadError::RowOutOfBounds {
                index,
                dimension: self.dimension,
            });
        }
        let start = index * self.dimension;
        Ok(&self.values[start..start + self.dimension])
    }

    /// N, the number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// A catalog and similarity matrix known to agree on size.
#[derive(Debug, Clone)]
pub struct Dataset {
    catalog: Catalog,
    matrix: SimilarityMatrix,
}

impl Dataset {
    /// Pair a catalog with its matrix, checking they line up
    pub fn new(catalog: Catalog, matrix: SimilarityMatrix) -> Result<Self> {
        if catalog.is_empty() {
            return Err(DataLoadError::EmptyDataset("catalog has no movies".to_string()));
        }
        if catalog.len() != matrix.dimension() {
            return Err(DataLoadError::DimensionMismatch(format!(
                "catalog has {} movies but similarity matrix is {}x{}",
                catalog.len(),
                matrix.dimension(),
                matrix.dimension()
            )));
        }
        Ok(Self { catalog, matrix })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Split into parts so each can be shared independently
    pub fn into_parts(self) -> (Catalog, SimilarityMatrix) {
        (self.catalog, self.matrix)
    }
}
