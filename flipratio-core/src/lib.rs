//! flipratio-core: Core types for flipping-ratio reduction.
//!
//! This crate provides the data model shared by the segmentation pipeline
//! and the scan-file I/O layer: detector images, region masks, the disk
//! structuring element, scan metadata, and intensity statistics.
//!

pub mod config;
pub mod disk;
pub mod error;
pub mod image;
pub mod mask;
pub mod metadata;
pub mod stats;

pub use config::{PeakCombine, ReductionConfig};
pub use disk::DiskShape;
pub use error::{Error, Result};
pub use image::DetectorImage;
pub use mask::Mask;
pub use metadata::{HklIndex, Rejection, ScanMetadata};
pub use stats::RegionIntensity;
