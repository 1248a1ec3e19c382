//! Boolean region masks.

use ndarray::Array2;

/// A boolean region mask with the same shape as its source image.
///
/// Masks mark membership of pixels in a region (peak, border, background)
/// and pass from pipeline stage to stage by value.
pub type Mask = Array2<bool>;

/// Counts the true pixels in a mask.
#[must_use]
pub fn count_true(mask: &Mask) -> usize {
    mask.iter().filter(|&&m| m).count()
}

/// Returns an all-false mask of the given (rows, cols) shape.
#[must_use]
pub fn blank(shape: (usize, usize)) -> Mask {
    Array2::from_elem(shape, false)
}
