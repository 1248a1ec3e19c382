//! Intensity integration with Poisson error propagation.
#![allow(clippy::cast_precision_loss)]

use flipratio_core::{mask, DetectorImage, Error, Mask, RegionIntensity, Result};

/// Variance assigned to a zero-count pixel.
///
/// A measured zero still carries counting uncertainty; without this floor,
/// empty pixels would enter the sums with no error at all.
pub const ZERO_COUNT_VARIANCE: f64 = 3.0;

/// Integrates the counts under a mask.
///
/// Pixels are visited in row-major order; when `limit` is given, only the
/// first `limit` masked pixels contribute, which lets the caller match the
/// background sample size to the peak sample size. Per-pixel variance is
/// the count itself, or [`ZERO_COUNT_VARIANCE`] for zero counts, and the
/// region error is the root-sum-square.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] when the mask shape differs from the image.
pub fn region_intensity(
    image: &DetectorImage,
    region: &Mask,
    limit: Option<usize>,
) -> Result<RegionIntensity> {
    if region.dim() != image.dim() {
        return Err(Error::ShapeMismatch {
            expected: image.dim(),
            found: region.dim(),
        });
    }

    let mut total = 0.0;
    let mut variance = 0.0;
    let mut taken = 0usize;
    let cap = limit.unwrap_or(usize::MAX);

    for (&count, &member) in image.counts().iter().zip(region.iter()) {
        if !member {
            continue;
        }
        if taken >= cap {
            break;
        }
        taken += 1;
        total += f64::from(count);
        variance += if count == 0 {
            ZERO_COUNT_VARIANCE
        } else {
            f64::from(count)
        };
    }

    Ok(RegionIntensity::new(total, variance.sqrt()))
}

/// Computes the background-subtracted intensity of the peak region.
///
/// The background sample is truncated to the peak sample size so the two
/// sums draw on equally many pixels. Net error adds the two region errors
/// in quadrature.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] when a mask shape differs from the image.
pub fn net_intensity(
    image: &DetectorImage,
    peak: &Mask,
    background: &Mask,
) -> Result<RegionIntensity> {
    let peak_stats = region_intensity(image, peak, None)?;
    let peak_pixels = mask::count_true(peak);
    let background_stats = region_intensity(image, background, Some(peak_pixels))?;

    let total = peak_stats.total - background_stats.total;
    let sigma = peak_stats
        .sigma
        .mul_add(peak_stats.sigma, background_stats.sigma * background_stats.sigma)
        .sqrt();
    Ok(RegionIntensity::new(total, sigma))
}

/// Flipping ratio of two net intensities with first-order error propagation.
///
/// Returns `(ratio, sigma)` where `ratio = i_up / i_dw`. The caller must
/// guard against a zero spin-down intensity; the reduction pipeline rejects
/// such pairs before reaching this point.
#[must_use]
pub fn flipping_ratio(i_up: f64, s_up: f64, i_dw: f64, s_dw: f64) -> (f64, f64) {
    let ratio = i_up / i_dw;
    let sigma = ((s_up / i_dw).powi(2) + (i_up * s_dw / (i_dw * i_dw)).powi(2)).sqrt();
    (ratio, sigma)
}
