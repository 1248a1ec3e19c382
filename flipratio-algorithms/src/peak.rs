//! Peak region detection from smoothed detector frames.

use crate::smooth::gaussian_filter;
use flipratio_core::{DetectorImage, Mask, PeakCombine};

/// Thresholds a smoothed frame into a boolean peak mask.
///
/// The frame is Gaussian-smoothed with the given sigma and every pixel
/// whose smoothed value exceeds `threshold` is marked. With the default
/// threshold of zero this flags the whole neighborhood of any counted
/// pixel.
#[must_use]
pub fn peak_region(image: &DetectorImage, sigma: f64, threshold: f64) -> Mask {
    gaussian_filter(image.counts(), sigma).mapv(|v| v > threshold)
}

/// Combines the spin-up and spin-down peak masks into the common peak.
#[must_use]
pub fn common_peak(up: &Mask, dw: &Mask, policy: PeakCombine) -> Mask {
    let mut combined = up.clone();
    match policy {
        PeakCombine::Or => combined.zip_mut_with(dw, |a, &b| *a |= b),
        PeakCombine::And => combined.zip_mut_with(dw, |a, &b| *a &= b),
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipratio_core::mask::{self, count_true};
    use ndarray::Array2;

    fn impulse_image(shape: (usize, usize), at: (usize, usize), value: u32) -> DetectorImage {
        let mut counts = Array2::<u32>::zeros(shape);
        counts[at] = value;
        DetectorImage::new(counts)
    }

    #[test]
    fn test_peak_region_covers_neighborhood() {
        let image = impulse_image((21, 21), (10, 10), 50);
        let peak = peak_region(&image, 1.0, 0.0);
        assert!(peak[[10, 10]]);
        assert!(peak[[10, 13]]);
        assert!(!peak[[10, 15]]);
        assert!(count_true(&peak) > 1);
    }

    #[test]
    fn test_peak_region_of_empty_frame_is_empty() {
        let image = DetectorImage::new(Array2::<u32>::zeros((16, 16)));
        let peak = peak_region(&image, 2.0, 0.0);
        assert_eq!(count_true(&peak), 0);
    }

    #[test]
    fn test_common_peak_union_and_intersection() {
        let mut up = mask::blank((2, 2));
        let mut dw = mask::blank((2, 2));
        up[[0, 0]] = true;
        up[[0, 1]] = true;
        dw[[0, 1]] = true;
        dw[[1, 0]] = true;

        let union = common_peak(&up, &dw, PeakCombine::Or);
        assert_eq!(count_true(&union), 3);

        let intersection = common_peak(&up, &dw, PeakCombine::And);
        assert_eq!(count_true(&intersection), 1);
        assert!(intersection[[0, 1]]);
    }
}
