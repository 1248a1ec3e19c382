//! Local background construction around the padded peak region.

use crate::border::{pad_with_disks, region_border};
use crate::patches::label_components;
use flipratio_core::{mask, DiskShape, Mask};
use log::{debug, warn};

/// Grows a background ring around the padded peak region.
///
/// The border of the padded region is dilated with disks of increasing
/// radius (starting at `start_radius`) and intersected with the complement
/// of the region until the candidate holds at least as many pixels as the
/// region itself, giving the two samples comparable statistics.
///
/// An empty region yields an empty background; callers must treat empty
/// peaks as a rejection before integrating. Growth is capped once the disk
/// spans the larger image dimension, at which point the dilation has
/// saturated the frame and further radii cannot add pixels.
#[must_use]
pub fn build_background(padded_peak: &Mask, start_radius: usize) -> Mask {
    let peak_pixels = mask::count_true(padded_peak);
    if peak_pixels == 0 {
        return mask::blank(padded_peak.dim());
    }

    let border = region_border(padded_peak);
    let (rows, cols) = padded_peak.dim();
    let max_radius = start_radius + rows.max(cols);
    let mut radius = start_radius;

    loop {
        let disk = DiskShape::new(radius);
        let mut background = pad_with_disks(&border, &disk);
        background.zip_mut_with(padded_peak, |b, &p| *b &= !p);

        let background_pixels = mask::count_true(&background);
        if background_pixels >= peak_pixels {
            debug!(
                "background matched peak area at radius {radius}: {background_pixels} >= {peak_pixels} px"
            );
            return background;
        }
        if radius >= max_radius {
            warn!(
                "background growth saturated at radius {radius} with {background_pixels} px for a {peak_pixels} px peak"
            );
            return background;
        }
        radius += 1;
    }
}

/// Strips background fragments that bleed off one or two frame edges.
///
/// For each such fragment the fragment's own border is re-dilated with the
/// padding disk and the dilated area is cleared from both the background
/// and the peak mask, so a truncated background cannot skew either sample.
pub fn remove_background_border_patches(background: &mut Mask, peaks: &mut Mask, disk: &DiskShape) {
    let components = label_components(background);
    let shape = background.dim();

    for (label, bb, _) in components.iter() {
        let touched = bb.edges_touched(shape);
        if touched == 0 || touched > 2 {
            continue;
        }
        let fragment = components.component_mask(label);
        let punch_out = pad_with_disks(&region_border(&fragment), disk);
        background.zip_mut_with(&punch_out, |b, &p| *b &= !p);
        peaks.zip_mut_with(&punch_out, |q, &p| *q &= !p);
    }
}
