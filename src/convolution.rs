// convolution.rs — Separable 1D convolution and Gaussian blur for Image<T>.
//
// A 2D convolution with a separable kernel K = k_col * k_row^T decomposes
// into two 1D passes, reducing cost from O(k²) to O(2k) per pixel. The
// guidance extractor's blur and both Sobel operators go through here.
//
// BORDER HANDLING: Clamp (replicate edge pixels).
// Out-of-bounds taps read the nearest edge pixel, so a constant image stays
// constant right up to the border and the blur has no dark halo.

use crate::image::{Image, Pixel};

/// Convolve each row of `src` with a 1D kernel (horizontal pass).
///
/// The kernel is applied centered: for a kernel of length K, the center
/// element is at index K/2.
///
/// Interior pixels (where the kernel never leaves the row) skip the clamp
/// and use unchecked access; border pixels clamp.
pub fn convolve_rows<T: Pixel>(src: &Image<T>, kernel: &[f32]) -> Image<f32> {
    assert!(!kernel.is_empty(), "kernel must not be empty");
    assert!(kernel.len() % 2 == 1, "kernel length must be odd (got {})", kernel.len());

    let w = src.width();
    let h = src.height();
    let half = kernel.len() / 2;
    let mut dst = Image::<f32>::new(w, h);

    let clamped = |x: usize, y: usize| -> f32 {
        let mut acc = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sx = (x as isize + ki as isize - half as isize).clamp(0, w as isize - 1) as usize;
            acc += src.get(sx, y).to_f32() * kv;
        }
        acc
    };

    for y in 0..h {
        if w > 2 * half {
            for x in 0..half {
                dst.set(x, y, clamped(x, y));
            }
            for x in half..(w - half) {
                let mut acc = 0.0f32;
                // SAFETY: x - half >= 0 and x + half < w, y < h.
                unsafe {
                    for (ki, &kv) in kernel.iter().enumerate() {
                        acc += src.get_unchecked(x + ki - half, y).to_f32() * kv;
                    }
                    dst.set_unchecked(x, y, acc);
                }
            }
            for x in (w - half)..w {
                dst.set(x, y, clamped(x, y));
            }
        } else {
            // Image narrower than the kernel: every pixel touches a border.
            for x in 0..w {
                dst.set(x, y, clamped(x, y));
            }
        }
    }
    dst
}

/// Convolve each column of `src` with a 1D kernel (vertical pass).
///
/// Input is the f32 output of `convolve_rows`.
pub fn convolve_cols(src: &Image<f32>, kernel: &[f32]) -> Image<f32> {
    assert!(!kernel.is_empty(), "kernel must not be empty");
    assert!(kernel.len() % 2 == 1, "kernel length must be odd (got {})", kernel.len());

    let w = src.width();
    let h = src.height();
    let half = kernel.len() / 2;
    let mut dst = Image::<f32>::new(w, h);

    let clamped = |x: usize, y: usize| -> f32 {
        let mut acc = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sy = (y as isize + ki as isize - half as isize).clamp(0, h as isize - 1) as usize;
            acc += src.get(x, sy) * kv;
        }
        acc
    };

    for y in 0..h {
        let interior = h > 2 * half && y >= half && y < h - half;
        for x in 0..w {
            if interior {
                let mut acc = 0.0f32;
                // SAFETY: y - half >= 0 and y + half < h, x < w.
                unsafe {
                    for (ki, &kv) in kernel.iter().enumerate() {
                        acc += src.get_unchecked(x, y + ki - half) * kv;
                    }
                    dst.set_unchecked(x, y, acc);
                }
            } else {
                dst.set(x, y, clamped(x, y));
            }
        }
    }
    dst
}

/// Full separable 2D convolution: horizontal pass then vertical pass.
///
/// Returns an `Image<f32>` regardless of input pixel type, because the
/// accumulation is in f32.
///
/// # Panics
/// Panics if either kernel is empty or has even length.
pub fn convolve_separable<T: Pixel>(
    src: &Image<T>,
    kernel_row: &[f32],
    kernel_col: &[f32],
) -> Image<f32> {
    let intermediate = convolve_rows(src, kernel_row);
    convolve_cols(&intermediate, kernel_col)
}

/// Generate a 1D Gaussian kernel with the given half-size and sigma.
///
/// Returns a kernel of length `2 * half_size + 1`, normalized so the
/// coefficients sum to 1.0.
///
/// # Examples
/// ```
/// let k = thermal_fusion::convolution::gaussian_kernel_1d(2, 1.0);
/// assert_eq!(k.len(), 5);
/// assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-6);
/// ```
pub fn gaussian_kernel_1d(half_size: usize, sigma: f32) -> Vec<f32> {
    assert!(sigma > 0.0, "sigma must be positive");
    let len = 2 * half_size + 1;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..len)
        .map(|i| {
            let x = i as f32 - half_size as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    // Normalize so coefficients sum to 1 (preserves brightness).
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Largest half-width `gaussian_kernel_size` will report.
const MAX_KERNEL_HALF: usize = usize::MAX / 4;

/// Odd Gaussian window size for a given sigma: `4σ` floored to an even
/// number, plus one, never below 3.
///
/// σ = 5.0 → 21, σ = 1.4 → 5, σ = 1.5 → 7, σ = 0.3 → 3.
pub fn gaussian_kernel_size(sigma: f32) -> usize {
    // `as usize` saturates (NaN → 0); the cap keeps `2 * half + 1` in range.
    let half = ((2.0 * sigma).floor().max(0.0) as usize).min(MAX_KERNEL_HALF);
    (2 * half + 1).max(3)
}

/// Gaussian window actually used on a `width × height` image.
///
/// Same as `gaussian_kernel_size`, but never wider than `2 · max(w, h) + 1`:
/// beyond that every extra tap reads a clamped border pixel the window
/// already covers.
pub fn gaussian_window_size(sigma: f32, width: usize, height: usize) -> usize {
    let cap = 2 * width.max(height).max(1) + 1;
    gaussian_kernel_size(sigma).min(cap)
}

/// Separable Gaussian blur with a window of
/// `gaussian_window_size(sigma, w, h)`.
///
/// # Panics
/// Panics if `sigma <= 0`. The guidance extractor validates sigma first.
pub fn gaussian_blur<T: Pixel>(src: &Image<T>, sigma: f32) -> Image<f32> {
    let size = gaussian_window_size(sigma, src.width(), src.height());
    let kernel = gaussian_kernel_1d(size / 2, sigma);
    convolve_separable(src, &kernel, &kernel)
}
