//! flipratio-algorithms: Segmentation and statistics for flipping-ratio reduction.
//!
//! This crate implements the image-analysis pipeline applied to each pair of
//! spin-up/spin-down detector frames:
//! - **peak** - Gaussian smoothing and thresholding into a common peak mask
//! - **border** - one-pixel region borders and disk-shaped padding
//! - **patches** - connected-component labeling and artifact rejection
//! - **background** - local background grown to match the peak area
//! - **integrate** - Poisson-error intensity sums and the flipping ratio
//! - **pipeline** - the per-pair orchestrator with its rejection rules
//!
#![warn(missing_docs)]

pub mod background;
pub mod border;
pub mod integrate;
pub mod patches;
pub mod peak;
pub mod pipeline;
pub mod smooth;

pub use background::{build_background, remove_background_border_patches};
pub use border::{pad_with_disks, padded_peak_region, region_border};
pub use integrate::{flipping_ratio, net_intensity, region_intensity};
pub use patches::{
    label_components, punch_out_border_and_small, remove_edge_patches, BoundingBox,
    ComponentLabels,
};
pub use peak::{common_peak, peak_region};
pub use pipeline::{evaluate_pair, segment_pair, PairReduction, RatioOutcome};
pub use smooth::gaussian_filter;

// Re-export the core configuration alongside the pipeline
pub use flipratio_core::{PeakCombine, ReductionConfig};
