//! Region borders and disk-shaped padding.

use flipratio_core::{mask, DiskShape, Mask};
use ndarray::s;

/// Marks the border pixels of a region.
///
/// A true pixel is border when any 4-connected neighbor is false or lies
/// outside the image; the frame edge itself counts as a border condition.
#[must_use]
pub fn region_border(region: &Mask) -> Mask {
    let (rows, cols) = region.dim();
    let mut border = mask::blank((rows, cols));

    for i in 0..rows {
        for j in 0..cols {
            if !region[[i, j]] {
                continue;
            }
            let exposed = (i == 0 || !region[[i - 1, j]])
                || (i + 1 == rows || !region[[i + 1, j]])
                || (j == 0 || !region[[i, j - 1]])
                || (j + 1 == cols || !region[[i, j + 1]]);
            if exposed {
                border[[i, j]] = true;
            }
        }
    }
    border
}

/// Dilates the border mask by stamping the disk on every true pixel.
///
/// The disk is OR-ed into a scratch canvas oversized by the disk radius on
/// each side, then the canvas is cropped back to the image extent, so disks
/// centered near the edge spill off silently. OR-accumulation makes the
/// result independent of the visitation order.
#[must_use]
pub fn pad_with_disks(border: &Mask, disk: &DiskShape) -> Mask {
    let (rows, cols) = border.dim();
    let r = disk.radius();
    let offsets = disk.offsets();
    let mut canvas = mask::blank((rows + 2 * r, cols + 2 * r));

    for ((i, j), &on) in border.indexed_iter() {
        if !on {
            continue;
        }
        for &(di, dj) in &offsets {
            canvas[[i + di, j + dj]] = true;
        }
    }

    canvas.slice(s![r..r + rows, r..r + cols]).to_owned()
}

/// Grows a peak region by padding its border with disks.
#[must_use]
pub fn padded_peak_region(peak: &Mask, disk: &DiskShape) -> Mask {
    let padding = pad_with_disks(&region_border(peak), disk);
    let mut padded = peak.clone();
    padded.zip_mut_with(&padding, |p, &q| *p |= q);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipratio_core::mask::count_true;

    fn filled_square(shape: (usize, usize), r0: usize, r1: usize, c0: usize, c1: usize) -> Mask {
        let mut region = mask::blank(shape);
        for i in r0..r1 {
            for j in c0..c1 {
                region[[i, j]] = true;
            }
        }
        region
    }

    #[test]
    fn test_border_of_interior_square() {
        let region = filled_square((10, 10), 3, 7, 3, 7);
        let border = region_border(&region);

        for i in 0..10 {
            for j in 0..10 {
                let on_perimeter = region[[i, j]]
                    && (i == 3 || i == 6 || j == 3 || j == 6);
                assert_eq!(border[[i, j]], on_perimeter, "pixel ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_frame_edge_counts_as_border() {
        let region = mask::blank((4, 4)).mapv(|_| true);
        let border = region_border(&region);
        assert!(border[[0, 2]]);
        assert!(border[[3, 0]]);
        assert!(!border[[1, 1]]);
        assert!(!border[[2, 2]]);
    }

    #[test]
    fn test_radius_zero_padding_is_identity() {
        let region = filled_square((8, 8), 2, 5, 1, 6);
        let disk = DiskShape::new(0);
        assert_eq!(pad_with_disks(&region, &disk), region);
    }

    #[test]
    fn test_single_pixel_dilates_to_disk() {
        let mut border = mask::blank((15, 15));
        border[[7, 7]] = true;
        let disk = DiskShape::new(3);
        let padded = pad_with_disks(&border, &disk);
        assert_eq!(count_true(&padded), disk.len());
        assert!(padded[[7, 7]]);
        assert!(padded[[5, 5]]);
        assert!(!padded[[7, 11]]);
    }

    #[test]
    fn test_disks_spill_off_the_edge() {
        let mut border = mask::blank((6, 6));
        border[[0, 0]] = true;
        let disk = DiskShape::new(3);
        let padded = pad_with_disks(&border, &disk);
        // only the in-frame quadrant of the disk survives the crop
        assert!(padded[[0, 0]]);
        assert!(padded[[2, 0]]);
        assert!(count_true(&padded) < disk.len());
    }

    #[test]
    fn test_padded_peak_region_contains_peak() {
        let peak = filled_square((20, 20), 8, 12, 8, 12);
        let disk = DiskShape::new(2);
        let padded = padded_peak_region(&peak, &disk);
        for ((i, j), &p) in peak.indexed_iter() {
            if p {
                assert!(padded[[i, j]]);
            }
        }
        assert!(count_true(&padded) > count_true(&peak));
    }
}
