//! Discovery and pairing of detector frames on disk.
//!
//! A polarized HB3A scan writes one frame per spin state per point; in
//! sorted filename order they alternate spin-up, spin-down.

use crate::error::Result;
use log::warn;
use std::path::{Path, PathBuf};

/// A spin-up/spin-down pair of detector frame files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPair {
    /// Frame measured with flipper off.
    pub spin_up: PathBuf,
    /// Frame measured with flipper on.
    pub spin_down: PathBuf,
}

/// The files belonging to one experiment/scan number in a data directory.
#[derive(Debug, Clone)]
pub struct ScanFileSet {
    data_dir: PathBuf,
    exp: u32,
    scan: u32,
}

impl ScanFileSet {
    /// Creates a file set for one experiment and scan number.
    pub fn new(data_dir: impl AsRef<Path>, exp: u32, scan: u32) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            exp,
            scan,
        }
    }

    /// Path of the scan `.dat` file carrying the UB matrix.
    #[must_use]
    pub fn scan_file(&self) -> PathBuf {
        self.data_dir
            .join(format!("HB3A_exp{:04}_scan{:04}.dat", self.exp, self.scan))
    }

    /// Filename prefix of the detector frames of this scan.
    #[must_use]
    pub fn image_prefix(&self) -> String {
        format!("HB3A_exp{}_scan{:04}_", self.exp, self.scan)
    }

    /// Lists the scan's detector frames in sorted order and pairs them
    /// consecutively as (spin-up, spin-down).
    ///
    /// An odd trailing frame has no partner and is skipped with a warning.
    ///
    /// # Errors
    /// Returns an I/O error when the data directory cannot be read.
    pub fn discover_pairs(&self) -> Result<Vec<ScanPair>> {
        let prefix = self.image_prefix();
        let mut frames: Vec<PathBuf> = Vec::new();

        for entry in std::fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&prefix) {
                frames.push(entry.path());
            }
        }
        frames.sort();

        if frames.len() % 2 != 0 {
            let odd = frames.pop();
            if let Some(odd) = odd {
                warn!("unpaired frame {} skipped", odd.display());
            }
        }

        Ok(frames
            .chunks_exact(2)
            .map(|pair| ScanPair {
                spin_up: pair[0].clone(),
                spin_down: pair[1].clone(),
            })
            .collect())
    }
}
