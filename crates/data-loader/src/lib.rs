//! # Data Loader Crate
//!
//! Loads the movie catalog and its precomputed item-item similarity matrix.
//!
//! ## Main Components
//!
//! - **types**: `Movie`, `Catalog`, `SimilarityMatrix`, `Dataset`
//! - **parser**: Parse the .dat artifacts into those types
//! - **index**: Load and cross-check a whole data directory
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_dir(Path::new("data"))?;
//!
//! let row = dataset.catalog().lookup_index("Avatar").unwrap();
//! let similarities = dataset.matrix().row(row)?;
//! println!("Avatar has {} similarity scores", similarities.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{CATALOG_FILE, MATRIX_FILE};
pub use types::{Catalog, Dataset, Movie, RowIndex, SimilarityMatrix};
