//! Error types for grid and word list construction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the inputs to a fill. Failing to find a fill is not an error; see
/// `FillFailure`.
#[derive(Debug, Error)]
pub enum Error {
    /// A structure or word list file couldn't be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The structure template had no rows.
    #[error("grid template is empty")]
    EmptyGrid,

    /// A cell is shared by more than two entries, or by two entries running the same way.
    #[error("conflicting grid entries at row {row}, column {col}")]
    ConflictingEntries { row: usize, col: usize },
}

/// Result type alias for grid and word list construction.
pub type Result<T> = std::result::Result<T, Error>;
