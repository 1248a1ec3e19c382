//! I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed scan or detector-image file.
    #[error("cannot parse {path}: {reason}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Core reduction error.
    #[error("reduction error: {0}")]
    Core(#[from] flipratio_core::Error),
}

impl Error {
    /// Builds a parse error for the given file.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
