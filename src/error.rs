//! Crate-wide error type and result alias.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors produced by the store reader, the benchmark runner, and the
/// result-log writer.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Underlying filesystem failure (store open, dataset read, log append).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// CSV encoding or decoding failure on the result log.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// The benchmark target file does not exist; checked before any dataset
    /// is attempted and before the log is touched.
    #[error("array store not found: {}", .0.display())]
    StoreNotFound(PathBuf),
    /// A requested dataset name is absent from the store directory.
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),
    /// The store file exists but its header or directory is malformed.
    #[error("corrupt array store: {0}")]
    Corruption(String),
    /// Caller-supplied argument rejected before any work was done.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
