//! Detector image type.

use ndarray::Array2;

/// A 2D detector frame of raw neutron counts.
///
/// Counts are stored in (row, col) orientation and are immutable once
/// loaded; every mask derived from the image shares its dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorImage {
    counts: Array2<u32>,
}

impl DetectorImage {
    /// Wraps a counts array in (row, col) orientation.
    #[inline]
    pub fn new(counts: Array2<u32>) -> Self {
        Self { counts }
    }

    /// Returns the raw counts.
    #[inline]
    #[must_use]
    pub fn counts(&self) -> &Array2<u32> {
        &self.counts
    }

    /// Returns the image dimensions as (rows, cols).
    #[inline]
    #[must_use]
    pub fn dim(&self) -> (usize, usize) {
        self.counts.dim()
    }

    /// Sums all counts in the frame.
    #[must_use]
    pub fn total_counts(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_counts() {
        let image = DetectorImage::new(Array2::from_shape_vec((2, 3), vec![1, 2, 3, 4, 5, 6]).unwrap());
        assert_eq!(image.dim(), (2, 3));
        assert_eq!(image.total_counts(), 21);
    }
}
