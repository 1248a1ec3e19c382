//! Reduction configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the spin-up and spin-down peak masks are combined.
///
/// Whether the common peak should be the union or the intersection of the
/// per-spin regions is an unresolved domain question; the union is the
/// historical behavior and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PeakCombine {
    /// Union of the per-spin masks.
    #[default]
    Or,
    /// Intersection of the per-spin masks.
    And,
}

/// Configuration for the flipping-ratio reduction pipeline.
///
/// The thresholds are domain-tuned values carried over from years of HB3A
/// reductions; they are exposed here rather than hard-coded so surveys can
/// vary them per experiment.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReductionConfig {
    /// Gaussian smoothing width (pixels) for peak detection.
    pub sigma: f64,
    /// Radius of the disk used to pad the peak border.
    pub disk_radius: usize,
    /// Policy for combining the per-spin peak masks.
    pub peak_combine: PeakCombine,
    /// Smoothed-intensity threshold above which a pixel belongs to the peak.
    pub peak_threshold: f64,
    /// Relative tolerance for rejecting patches sized like the padding disk.
    pub patch_size_tolerance: f64,
    /// Initial disk radius for background growth.
    pub background_start_radius: usize,
    /// Significance factor: net intensity must exceed this many times its error.
    pub significance: f64,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            sigma: 3.0,
            disk_radius: 10,
            peak_combine: PeakCombine::default(),
            peak_threshold: 0.0,
            patch_size_tolerance: 0.1,
            background_start_radius: 10,
            significance: 2.0,
        }
    }
}

impl ReductionConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Gaussian smoothing width.
    #[must_use]
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Sets the padding disk radius.
    #[must_use]
    pub fn with_disk_radius(mut self, radius: usize) -> Self {
        self.disk_radius = radius;
        self
    }

    /// Sets the peak combination policy.
    #[must_use]
    pub fn with_peak_combine(mut self, policy: PeakCombine) -> Self {
        self.peak_combine = policy;
        self
    }

    /// Sets the smoothed-intensity peak threshold.
    #[must_use]
    pub fn with_peak_threshold(mut self, threshold: f64) -> Self {
        self.peak_threshold = threshold;
        self
    }

    /// Sets the disk-sized patch rejection tolerance.
    #[must_use]
    pub fn with_patch_size_tolerance(mut self, tolerance: f64) -> Self {
        self.patch_size_tolerance = tolerance;
        self
    }

    /// Sets the initial background growth radius.
    #[must_use]
    pub fn with_background_start_radius(mut self, radius: usize) -> Self {
        self.background_start_radius = radius;
        self
    }

    /// Sets the significance factor.
    #[must_use]
    pub fn with_significance(mut self, k: f64) -> Self {
        self.significance = k;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReductionConfig::default();
        assert!((config.sigma - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.disk_radius, 10);
        assert_eq!(config.peak_combine, PeakCombine::Or);
        assert_eq!(config.background_start_radius, 10);
    }

    #[test]
    fn test_builder() {
        let config = ReductionConfig::new()
            .with_sigma(1.5)
            .with_disk_radius(6)
            .with_peak_combine(PeakCombine::And)
            .with_significance(3.0);

        assert!((config.sigma - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.disk_radius, 6);
        assert_eq!(config.peak_combine, PeakCombine::And);
        assert!((config.significance - 3.0).abs() < f64::EPSILON);
    }
}
