//! Error types for flipratio-core.

use crate::metadata::HklIndex;
use thiserror::Error;

/// Result type alias for reduction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for reduction operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Spin-up and spin-down scans index different reflections.
    #[error("spin up/down scans index different reflections: {up} vs {dw}")]
    HklMismatch {
        /// Reflection of the spin-up scan.
        up: HklIndex,
        /// Reflection of the spin-down scan.
        dw: HklIndex,
    },

    /// A mask or image does not have the expected dimensions.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Dimensions (rows, cols) the operation requires.
        expected: (usize, usize),
        /// Dimensions actually supplied.
        found: (usize, usize),
    },
}
