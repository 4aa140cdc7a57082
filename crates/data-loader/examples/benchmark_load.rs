//! Times each artifact parse separately and reports the matrix footprint.
//!
//! Usage: `cargo run --release --example benchmark_load -- [DATA_DIR]`

use data_loader::{CATALOG_FILE, Dataset, MATRIX_FILE, parser};
use std::path::PathBuf;
use std::time::Instant;

fn main() -> data_loader::Result<()> {
    let data_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    println!("Parsing artifacts in {}\n", data_dir.display());

    let start = Instant::now();
    let catalog = parser::parse_catalog(&data_dir.join(CATALOG_FILE))?;
    let catalog_time = start.elapsed();

    let start = Instant::now();
    let matrix = parser::parse_matrix(&data_dir.join(MATRIX_FILE))?;
    let matrix_time = start.elapsed();

    let dataset = Dataset::new(catalog, matrix)?;
    let dimension = dataset.matrix().dimension();
    let cells = dimension * dimension;
    let matrix_bytes = cells * std::mem::size_of::<f32>();

    println!("{:<16} {:>10?}  ({} titles)", CATALOG_FILE, catalog_time, dataset.catalog().len());
    println!("{:<16} {:>10?}  ({}x{})", MATRIX_FILE, matrix_time, dimension, dimension);
    println!(
        "\nMatrix buffer: {} bytes ({:.1} MiB)",
        matrix_bytes,
        matrix_bytes as f64 / (1024.0 * 1024.0)
    );
    println!(
        "Matrix parse rate: {:.0} cells/second",
        cells as f64 / matrix_time.as_secs_f64()
    );
    Ok(())
}
