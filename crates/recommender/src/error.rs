//! Errors returned by the recommendation engine and cache.

use thiserror::Error;

/// Why a recommendation request failed.
///
/// `Clone` so that one computed failure can be handed to every caller that
/// was waiting on the same in-flight key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    /// Queried title is not in the catalog
    #[error("Movie '{0}' not found")]
    NotFound(String),

    /// Caller passed an unusable argument (e.g. a count of zero)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Catalog and matrix disagree; the loaded dataset is corrupt
    #[error("Dataset integrity error: {0}")]
    Integrity(String),
}

impl RecommendError {
    /// Whether this error points at a broken process rather than a bad request
    pub fn is_fatal(&self) -> bool {
        matches!(self, RecommendError::Integrity(_))
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
