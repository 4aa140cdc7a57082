//! Parser for the dataset artifacts.
//!
//! - movie_list.dat: `rowIndex::title`, one movie per line, rows numbered from 0
//! - similarity.dat: one matrix row per line, cells separated by whitespace or commas
//!
//! Blank lines are skipped in both files. Titles are split off at the first
//! `::` so they may themselves contain `::`.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a whole artifact into memory, turning a missing file into `FileNotFound`
fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Non-empty, trimmed lines paired with their 1-based line numbers
fn numbered_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect()
}

/// Parse the movie_list.dat file
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = read_to_string(path)?;
    parse_catalog_str(&content, &file_label(path))
}

/// Parse catalog text. `file` is only used in error messages.
pub fn parse_catalog_str(content: &str, file: &str) -> Result<Catalog> {
    let mut titles = Vec::new();

    for (line_no, line) in numbered_lines(content) {
        let (row_str, title) = line.split_once("::").ok_or_else(|| {
            DataLoadError::FieldCountMismatch {
                file: file.to_string(),
                expected: 2,
                found: 1,
                line: line_no,
            }
        })?;

        let row_index: RowIndex = row_str.trim().parse().map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid row index '{}': {}", row_str, e),
        })?;

        if row_index != titles.len() {
            return Err(DataLoadError::NonContiguousIndex {
                expected: titles.len(),
                found: row_index,
                line: line_no,
            });
        }

        if title.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Missing title".to_string(),
            });
        }

        titles.push(title.to_string());
    }

    Catalog::from_titles(titles)
}

/// Parse the similarity.dat file
pub fn parse_matrix(path: &Path) -> Result<SimilarityMatrix> {
    let content = read_to_string(path)?;
    parse_matrix_str(&content, &file_label(path))
}

/// Parse matrix text. Rows are parsed in parallel.
pub fn parse_matrix_str(content: &str, file: &str) -> Result<SimilarityMatrix> {
    let lines = numbered_lines(content);

    let rows: Vec<Vec<f32>> = lines
        .par_iter()
        .map(|&(line_no, line)| parse_matrix_row(line, line_no, file))
        .collect::<Result<Vec<_>>>()?;

    // Report the first ragged row with its line number before building
    let dimension = rows.len();
    for (&(line_no, _), row) in lines.iter().zip(&rows) {
        if row.len() != dimension {
            return Err(DataLoadError::FieldCountMismatch {
                file: file.to_string(),
                expected: dimension,
                found: row.len(),
                line: line_no,
            });
        }
    }

    SimilarityMatrix::from_rows(rows)
}

fn parse_matrix_row(line: &str, line_no: usize, file: &str) -> Result<Vec<f32>> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            cell.parse::<f32>().map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Invalid similarity '{}': {}", cell, e),
            })
        })
        .collect()
}
