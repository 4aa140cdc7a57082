//! Dataset loading from a data directory.
//!
//! The directory must contain:
//! - `movie_list.dat` (catalog)
//! - `similarity.dat` (matrix aligned to catalog rows)
//!
//! Both files are parsed in parallel, then checked against each other.

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// File name of the catalog inside a data directory
pub const CATALOG_FILE: &str = "movie_list.dat";

/// File name of the similarity matrix inside a data directory
pub const MATRIX_FILE: &str = "similarity.dat";

impl Dataset {
    /// Load the catalog and similarity matrix from a directory
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Propagate the first parse error
    /// 3. Check that the matrix is N x N for an N-movie catalog
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading dataset from {:?}", data_dir);
        let start = Instant::now();

        let catalog_path = data_dir.join(CATALOG_FILE);
        let matrix_path = data_dir.join(MATRIX_FILE);

        // The matrix is by far the bigger file; its rows are parsed with
        // par_iter inside parse_matrix as well
        let (catalog, matrix) = rayon::join(
            || parser::parse_catalog(&catalog_path),
            || parser::parse_matrix(&matrix_path),
        );
        let catalog = catalog?;
        let matrix = matrix?;

        let dataset = Dataset::new(catalog, matrix)?;

        info!(
            "Loaded {} movies and a {}x{} similarity matrix in {:?}",
            dataset.catalog().len(),
            dataset.matrix().dimension(),
            dataset.matrix().dimension(),
            start.elapsed()
        );
        Ok(dataset)
    }
}
