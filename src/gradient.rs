// gradient.rs — First-derivative operators (3×3 Sobel).
//
// Sobel kernels are separable:
//   Sobel_x: row [-1, 0, 1] (derivative along x), col [1, 2, 1] (smoothing)
//   Sobel_y: row [ 1, 2, 1] (smoothing),          col [-1, 0, 1] (derivative)
//
// Both go through convolve_separable, so border handling (clamp/replicate)
// is inherited. Used twice by the mask builder: on the 8-bit luminance
// inside Canny, and on the float luminance for the soft mask.

use crate::convolution::convolve_separable;
use crate::image::{Image, Pixel};

/// Sobel kernels, unnormalized.
const SOBEL_DERIV: [f32; 3] = [-1.0, 0.0, 1.0];
const SOBEL_SMOOTH: [f32; 3] = [1.0, 2.0, 1.0];

/// Horizontal gradient Ix. Positive when intensity increases to the right.
pub fn sobel_x<T: Pixel>(src: &Image<T>) -> Image<f32> {
    convolve_separable(src, &SOBEL_DERIV, &SOBEL_SMOOTH)
}

/// Vertical gradient Iy. Positive when intensity increases downward.
pub fn sobel_y<T: Pixel>(src: &Image<T>) -> Image<f32> {
    convolve_separable(src, &SOBEL_SMOOTH, &SOBEL_DERIV)
}

/// Both gradients at once.
pub fn sobel_xy<T: Pixel>(src: &Image<T>) -> (Image<f32>, Image<f32>) {
    (sobel_x(src), sobel_y(src))
}

/// Euclidean gradient magnitude `sqrt(gx² + gy²)`.
///
/// # Panics
/// Panics if `gx` and `gy` differ in size.
pub fn magnitude(gx: &Image<f32>, gy: &Image<f32>) -> Image<f32> {
    gx.zip_map(gy, |a, b| (a * a + b * b).sqrt())
}
