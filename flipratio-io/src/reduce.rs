//! File-level reduction entry points and the batch driver.

use crate::error::{Error, Result};
use crate::scanner::ScanPair;
use crate::spice::load_scan_image;
use flipratio_algorithms::{evaluate_pair, PairReduction};
use flipratio_core::ReductionConfig;
use log::warn;
use rayon::prelude::*;
use std::path::Path;

/// Reduces one spin-up/spin-down pair of detector frame files.
///
/// Loads both frames, checks that they index the same reflection, and runs
/// the segmentation and integration pipeline.
///
/// # Errors
/// Returns a parse error for malformed files and a pairing error when the
/// two frames index different reflections. Statistical rejections are not
/// errors; they come back inside the [`PairReduction`].
pub fn compute_flipping_ratio(
    spin_up: impl AsRef<Path>,
    spin_down: impl AsRef<Path>,
    config: &ReductionConfig,
) -> Result<PairReduction> {
    let (up_image, up_meta) = load_scan_image(spin_up)?;
    let (dw_image, dw_meta) = load_scan_image(spin_down)?;
    evaluate_pair(&up_image, &up_meta, &dw_image, &dw_meta, config).map_err(Error::from)
}

/// Outcome of one pair within a batch reduction.
#[derive(Debug)]
pub struct PairOutcome {
    /// The pair of frame files that was evaluated.
    pub pair: ScanPair,
    /// The reduction, or the per-pair error that stopped it.
    pub reduction: Result<PairReduction>,
}

/// Reduces a set of scan pairs in parallel.
///
/// Pairs are independent, so they are evaluated across the rayon thread
/// pool. A pair that fails to parse or pair up is reported in its outcome
/// and does not stop the remaining pairs.
#[must_use]
pub fn reduce_scan_pairs(pairs: &[ScanPair], config: &ReductionConfig) -> Vec<PairOutcome> {
    pairs
        .par_iter()
        .map(|pair| {
            let reduction = compute_flipping_ratio(&pair.spin_up, &pair.spin_down, config);
            if let Err(err) = &reduction {
                warn!("pair {} not reduced: {err}", pair.spin_up.display());
            }
            PairOutcome {
                pair: pair.clone(),
                reduction,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipratio_core::Rejection;
    use std::path::PathBuf;

    fn write_zero_frame(dir: &Path, name: &str, h: f64) -> PathBuf {
        let side = 32;
        let blob = vec!["0"; side * side].join("\t");
        let xml = format!(
            "<SPICErack><Header>\
             <Number_of_X_Pixels>{side}</Number_of_X_Pixels>\
             <Number_of_Y_Pixels>{side}</Number_of_Y_Pixels>\
             </Header><Motor_Positions>\
             <_h>{h}</_h><_k>0.0</_k><_l>1.0</_l>\
             </Motor_Positions><Data><Detector>{blob}</Detector></Data></SPICErack>"
        );
        let path = dir.join(name);
        std::fs::write(&path, xml).unwrap();
        path
    }

    #[test]
    fn test_zero_frames_are_rejected_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let up = write_zero_frame(dir.path(), "up.xml", 1.0);
        let dw = write_zero_frame(dir.path(), "dw.xml", 1.0);

        let reduction =
            compute_flipping_ratio(&up, &dw, &ReductionConfig::default()).unwrap();
        assert_eq!(reduction.rejection(), Some(Rejection::NoPeak));
    }

    #[test]
    fn test_mismatched_reflections_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let up = write_zero_frame(dir.path(), "up.xml", 1.0);
        let dw = write_zero_frame(dir.path(), "dw.xml", 2.0);

        let err = compute_flipping_ratio(&up, &dw, &ReductionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(flipratio_core::Error::HklMismatch { .. })
        ));
    }

    #[test]
    fn test_batch_continues_past_bad_pair() {
        let dir = tempfile::tempdir().unwrap();
        let up = write_zero_frame(dir.path(), "up.xml", 1.0);
        let dw = write_zero_frame(dir.path(), "dw.xml", 1.0);
        let broken = dir.path().join("broken.xml");
        std::fs::write(&broken, "not xml at all").unwrap();

        let pairs = vec![
            ScanPair {
                spin_up: broken.clone(),
                spin_down: dw.clone(),
            },
            ScanPair {
                spin_up: up,
                spin_down: dw,
            },
        ];
        let outcomes = reduce_scan_pairs(&pairs, &ReductionConfig::default());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].reduction.is_err());
        assert!(outcomes[1].reduction.is_ok());
    }
}
