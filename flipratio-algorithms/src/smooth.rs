//! Gaussian smoothing of detector frames.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use ndarray::Array2;

/// Truncation of the Gaussian kernel in units of sigma.
const KERNEL_TRUNCATE: f64 = 4.0;

/// Applies a separable Gaussian filter to a counts array.
///
/// The kernel is truncated at `4 * sigma` and the image is extended by
/// reflection at the edges. A non-positive `sigma` returns the counts
/// converted to floats unchanged.
#[must_use]
pub fn gaussian_filter(counts: &Array2<u32>, sigma: f64) -> Array2<f64> {
    let input = counts.mapv(f64::from);
    if sigma <= 0.0 {
        return input;
    }

    let radius = (KERNEL_TRUNCATE * sigma + 0.5) as usize;
    if radius == 0 {
        return input;
    }
    let kernel = gaussian_kernel(sigma, radius);

    let rows_pass = convolve_rows(&input, &kernel);
    let cols_pass = convolve_rows(&rows_pass.reversed_axes(), &kernel);
    cols_pass.reversed_axes()
}

/// Normalized 1D Gaussian taps for the given sigma and pixel radius.
fn gaussian_kernel(sigma: f64, radius: usize) -> Vec<f64> {
    let r = radius as isize;
    let mut taps: Vec<f64> = (-r..=r)
        .map(|x| {
            let x = x as f64;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Convolves every row of `input` with `kernel`, reflecting at the edges.
fn convolve_rows(input: &Array2<f64>, kernel: &[f64]) -> Array2<f64> {
    let (rows, cols) = input.dim();
    let mut out = Array2::zeros((rows, cols));
    if rows == 0 || cols == 0 {
        return out;
    }
    let radius = (kernel.len() - 1) / 2;

    for i in 0..rows {
        for j in 0..cols {
            let mut acc = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let src = j as isize + k as isize - radius as isize;
                acc += w * input[[i, reflect_index(src, cols)]];
            }
            out[[i, j]] = acc;
        }
    }
    out
}

/// Maps an index outside `0..len` back inside by mirror reflection.
fn reflect_index(mut index: isize, len: usize) -> usize {
    let n = len as isize;
    loop {
        if index < 0 {
            index = -index - 1;
        } else if index >= n {
            index = 2 * n - index - 1;
        } else {
            return index as usize;
        }
    }
}
