//! flipratio-io: SPICE scan-file I/O and batch reduction.
//!
//! This crate parses HB3A SPICE files (2D detector XML frames and the
//! UB-matrix scan header), discovers spin-up/spin-down scan pairs on disk,
//! and drives the reduction pipeline over whole scans.
//!

pub mod error;
pub mod reduce;
pub mod scanner;
pub mod spice;
pub mod ub;

pub use error::{Error, Result};
pub use reduce::{compute_flipping_ratio, reduce_scan_pairs, PairOutcome};
pub use scanner::{ScanFileSet, ScanPair};
pub use spice::load_scan_image;
pub use ub::read_ub_matrix;
