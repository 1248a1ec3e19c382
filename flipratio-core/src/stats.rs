//! Intensity statistics for integrated regions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integrated counts of a region with its propagated counting error.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionIntensity {
    /// Summed counts (net intensities may be negative).
    pub total: f64,
    /// Propagated Poisson standard error.
    pub sigma: f64,
}

impl RegionIntensity {
    /// Creates an intensity statistic.
    #[inline]
    pub fn new(total: f64, sigma: f64) -> Self {
        Self { total, sigma }
    }

    /// Whether the intensity exceeds `k` times its own error.
    #[inline]
    #[must_use]
    pub fn is_significant(&self, k: f64) -> bool {
        self.total >= k * self.sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance() {
        let strong = RegionIntensity::new(100.0, 10.0);
        assert!(strong.is_significant(2.0));

        let weak = RegionIntensity::new(15.0, 10.0);
        assert!(!weak.is_significant(2.0));
    }
}
