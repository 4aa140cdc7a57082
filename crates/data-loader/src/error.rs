//! Error types for the data-loader crate.
//!
//! Every variant here is fatal at startup: a service that cannot load its
//! catalog and similarity matrix must not start serving.

use thiserror::Error;

/// Errors that can occur while loading the catalog and similarity matrix
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line} of {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// The same title appears on more than one catalog row
    #[error("Duplicate title '{title}' at rows {first} and {second}")]
    DuplicateTitle {
        title: String,
        first: usize,
        second: usize,
    },

    /// Catalog rows must be numbered 0, 1, 2, ... in file order
    #[error("Expected row index {expected} but found {found} at line {line}")]
    NonContiguousIndex {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Catalog and matrix (or matrix rows and columns) disagree on size
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A row was requested that the matrix doesn't have
    #[error("Row {index} out of bounds for matrix of dimension {dimension}")]
    RowOutOfBounds { index: usize, dimension: usize },

    /// Nothing to serve
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
