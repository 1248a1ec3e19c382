//! Per-pair reduction: segmentation, integration, and rejection rules.

use crate::background::{build_background, remove_background_border_patches};
use crate::border::padded_peak_region;
use crate::integrate::{flipping_ratio, net_intensity};
use crate::patches::punch_out_border_and_small;
use crate::peak::{common_peak, peak_region};
use flipratio_core::{
    mask, DetectorImage, DiskShape, Error, Mask, ReductionConfig, Rejection, Result, ScanMetadata,
};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Terminal outcome of evaluating one scan pair.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RatioOutcome {
    /// The pair passed every rejection rule.
    Accepted {
        /// Flipping ratio of the reflection.
        ratio: f64,
        /// Propagated standard error of the ratio.
        sigma: f64,
    },
    /// The pair was evaluated and rejected.
    Rejected(Rejection),
}

/// Result of reducing one spin-up/spin-down scan pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairReduction {
    /// Metadata of the reflection, annotated with the rejection reason
    /// when the pair was rejected.
    pub metadata: ScanMetadata,
    /// Accepted ratio or rejection.
    pub outcome: RatioOutcome,
}

impl PairReduction {
    /// Whether the pair was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, RatioOutcome::Accepted { .. })
    }

    /// The accepted (ratio, sigma), if any.
    #[must_use]
    pub fn ratio(&self) -> Option<(f64, f64)> {
        match self.outcome {
            RatioOutcome::Accepted { ratio, sigma } => Some((ratio, sigma)),
            RatioOutcome::Rejected(_) => None,
        }
    }

    /// The rejection reason, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<Rejection> {
        match self.outcome {
            RatioOutcome::Accepted { .. } => None,
            RatioOutcome::Rejected(reason) => Some(reason),
        }
    }
}

/// Segments a scan pair into its padded peak region and background.
///
/// Runs peak detection on both frames, combines them under the configured
/// policy, pads the border with disks, punches out edge and disk-sized
/// patches, and grows the matching-area background. Returns the final
/// (peak, background) masks; both are empty when no peak survives.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] when the two frames differ in shape.
pub fn segment_pair(
    up: &DetectorImage,
    dw: &DetectorImage,
    config: &ReductionConfig,
) -> Result<(Mask, Mask)> {
    if up.dim() != dw.dim() {
        return Err(Error::ShapeMismatch {
            expected: up.dim(),
            found: dw.dim(),
        });
    }

    let peak_up = peak_region(up, config.sigma, config.peak_threshold);
    let peak_dw = peak_region(dw, config.sigma, config.peak_threshold);
    let common = common_peak(&peak_up, &peak_dw, config.peak_combine);
    debug!("common peak: {} px", mask::count_true(&common));

    let disk = DiskShape::new(config.disk_radius);
    let mut padded = padded_peak_region(&common, &disk);
    punch_out_border_and_small(&mut padded, &disk, config.patch_size_tolerance);
    debug!("padded peak region: {} px", mask::count_true(&padded));

    if mask::count_true(&padded) == 0 {
        return Ok((padded, mask::blank(up.dim())));
    }

    let mut background = build_background(&padded, config.background_start_radius);
    remove_background_border_patches(&mut background, &mut padded, &disk);
    debug!("background: {} px", mask::count_true(&background));

    Ok((padded, background))
}

/// Evaluates one spin-up/spin-down pair into a flipping ratio or rejection.
///
/// Rejection rules are checked in order, first match wins: an empty peak
/// region, a negative net intensity, then a net intensity below the
/// configured significance. Rejections are regular outcomes; only pairing
/// and shape mismatches are errors.
///
/// # Errors
/// Returns [`Error::HklMismatch`] when the two scans index different
/// reflections and [`Error::ShapeMismatch`] when the frames disagree in
/// shape.
pub fn evaluate_pair(
    up: &DetectorImage,
    up_meta: &ScanMetadata,
    dw: &DetectorImage,
    dw_meta: &ScanMetadata,
    config: &ReductionConfig,
) -> Result<PairReduction> {
    if up_meta.hkl != dw_meta.hkl {
        return Err(Error::HklMismatch {
            up: up_meta.hkl,
            dw: dw_meta.hkl,
        });
    }

    let (peak, background) = segment_pair(up, dw, config)?;

    if mask::count_true(&peak) < 1 {
        return Ok(reject(up_meta, Rejection::NoPeak));
    }

    let net_up = net_intensity(up, &peak, &background)?;
    let net_dw = net_intensity(dw, &peak, &background)?;
    debug!(
        "net intensities: up {:.1} +- {:.1}, dw {:.1} +- {:.1}",
        net_up.total, net_up.sigma, net_dw.total, net_dw.sigma
    );

    if net_up.total < 0.0 || net_dw.total < 0.0 {
        return Ok(reject(up_meta, Rejection::NegativeIntensity));
    }
    if !net_up.is_significant(config.significance) || !net_dw.is_significant(config.significance) {
        return Ok(reject(up_meta, Rejection::LowSignificance));
    }

    let (ratio, sigma) = flipping_ratio(net_up.total, net_up.sigma, net_dw.total, net_dw.sigma);
    Ok(PairReduction {
        metadata: up_meta.clone(),
        outcome: RatioOutcome::Accepted { ratio, sigma },
    })
}

fn reject(meta: &ScanMetadata, reason: Rejection) -> PairReduction {
    PairReduction {
        metadata: meta.with_rejection(reason),
        outcome: RatioOutcome::Rejected(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipratio_core::HklIndex;
    use ndarray::Array2;

    #[test]
    fn test_hkl_mismatch_is_fatal() {
        let image = DetectorImage::new(Array2::<u32>::zeros((8, 8)));
        let up_meta = ScanMetadata::new(HklIndex::new(1, 0, 0));
        let dw_meta = ScanMetadata::new(HklIndex::new(0, 1, 0));
        let result = evaluate_pair(
            &image,
            &up_meta,
            &image,
            &dw_meta,
            &ReductionConfig::default(),
        );
        assert!(matches!(result, Err(Error::HklMismatch { .. })));
    }

    #[test]
    fn test_empty_frames_reject_no_peak() {
        let image = DetectorImage::new(Array2::<u32>::zeros((32, 32)));
        let meta = ScanMetadata::new(HklIndex::new(1, 1, 0));
        let reduction = evaluate_pair(
            &image,
            &meta,
            &image,
            &meta,
            &ReductionConfig::default(),
        )
        .unwrap();
        assert_eq!(reduction.rejection(), Some(Rejection::NoPeak));
        assert_eq!(reduction.metadata.rejection, Some(Rejection::NoPeak));
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let up = DetectorImage::new(Array2::<u32>::zeros((8, 8)));
        let dw = DetectorImage::new(Array2::<u32>::zeros((8, 9)));
        let meta = ScanMetadata::new(HklIndex::new(1, 0, 0));
        let result = evaluate_pair(&up, &meta, &dw, &meta, &ReductionConfig::default());
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }
}
