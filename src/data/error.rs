//! Data layer errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or exporting data files
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    /// A `date` cell is not `YYYY-MM-DD`
    #[error("Bad date {value:?} in {path:?}")]
    BadDate { path: PathBuf, value: String },
    /// A required column is absent or has the wrong type
    #[error("Column {column:?} in {path:?} is missing or not {expected}")]
    Column {
        path: PathBuf,
        column: String,
        expected: &'static str,
    },
}
