//! Scan metadata: reflection indices and terminal rejection reasons.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Miller indices of a reflection, rounded to integers from motor positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HklIndex {
    /// H index.
    pub h: i32,
    /// K index.
    pub k: i32,
    /// L index.
    pub l: i32,
}

impl HklIndex {
    /// Creates a reflection index.
    #[inline]
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        Self { h, k, l }
    }

    /// Rounds floating-point motor positions to the nearest reflection.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_motor_positions(h: f64, k: f64, l: f64) -> Self {
        Self {
            h: h.round() as i32,
            k: k.round() as i32,
            l: l.round() as i32,
        }
    }
}

impl fmt::Display for HklIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.h, self.k, self.l)
    }
}

/// Why a scan pair was rejected by the reduction.
///
/// Rejections are terminal outcomes of a successful pipeline run, not
/// errors: the pair was evaluated and found unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rejection {
    /// No peak region survived segmentation.
    #[cfg_attr(feature = "serde", serde(rename = "no peak"))]
    NoPeak,
    /// A net intensity came out negative.
    #[cfg_attr(feature = "serde", serde(rename = "negative intensity"))]
    NegativeIntensity,
    /// A net intensity is not statistically significant.
    #[cfg_attr(feature = "serde", serde(rename = "I/s"))]
    LowSignificance,
}

impl Rejection {
    /// Reason code as reported in reduction tables.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::NoPeak => "no peak",
            Rejection::NegativeIntensity => "negative intensity",
            Rejection::LowSignificance => "I/s",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to a detector scan.
///
/// Created at load time; the rejection field is only set on the early-exit
/// paths of the reduction pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanMetadata {
    /// Reflection measured by this scan.
    pub hkl: HklIndex,
    /// Terminal rejection reason, if the pair was rejected.
    pub rejection: Option<Rejection>,
}

impl ScanMetadata {
    /// Creates metadata for a reflection with no rejection.
    #[inline]
    pub fn new(hkl: HklIndex) -> Self {
        Self {
            hkl,
            rejection: None,
        }
    }

    /// Returns a copy annotated with a rejection reason.
    #[must_use]
    pub fn with_rejection(&self, reason: Rejection) -> Self {
        Self {
            hkl: self.hkl,
            rejection: Some(reason),
        }
    }
}
