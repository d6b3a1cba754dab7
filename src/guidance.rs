// guidance.rs — Stage 3: luminance and base/detail decomposition of the
// optical guide.
//
//   luminance = 0.299 R + 0.587 G + 0.114 B
//   base      = Gaussian(luminance, k, sigma),  k = gaussian_window_size(sigma, w, h)
//   detail    = luminance - base
//
// The detail layer carries the high-frequency structure that gets injected
// into the thermal band; the base layer is only kept so the split can be
// inspected and reconstructed.

use tracing::debug;

use crate::convert::rgb_to_grayscale;
use crate::convolution::{gaussian_blur, gaussian_window_size};
use crate::error::{FusionError, Result};
use crate::image::Image;
use crate::rgb::RgbPlanes;

/// Low/high-frequency split of a luminance map.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Gaussian-smoothed luminance.
    pub base: Image<f32>,
    /// `luminance - base`.
    pub detail: Image<f32>,
}

impl Decomposition {
    /// `base + detail`. Equals the source luminance up to one f32 rounding
    /// step per sample.
    pub fn reconstruct(&self) -> Image<f32> {
        self.base.zip_map(&self.detail, |b, d| b + d)
    }
}

/// Perceptual luminance of a normalized RGB image, in [0, 1].
pub fn luminance(rgb: &RgbPlanes) -> Image<f32> {
    rgb_to_grayscale(&rgb.r, &rgb.g, &rgb.b)
}

/// Reject sigmas that cannot define a Gaussian.
pub fn validate_sigma(sigma: f32) -> Result<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FusionError::invalid_parameter(
            "blur_sigma",
            format!("must be finite and > 0, got {sigma}"),
        ));
    }
    Ok(())
}

/// Split `lum` into a Gaussian base and the residual detail.
pub fn decompose(lum: &Image<f32>, sigma: f32) -> Result<Decomposition> {
    validate_sigma(sigma)?;
    let base = gaussian_blur(lum, sigma);
    let detail = lum.zip_map(&base, |l, b| l - b);
    debug!(
        sigma,
        kernel = gaussian_window_size(sigma, lum.width(), lum.height()),
        "decomposed luminance"
    );
    Ok(Decomposition { base, detail })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::rgb_to_planes;
    use crate::rgb::RgbImage;

    #[test]
    fn test_luminance_weights() {
        let rgb = RgbImage::from_vec(3, 1, vec![255, 0, 0, 0, 255, 0, 255, 255, 255]);
        let lum = luminance(&rgb_to_planes(&rgb));
        assert!((lum.get(0, 0) - 0.299).abs() < 1e-6);
        assert!((lum.get(1, 0) - 0.587).abs() < 1e-6);
        assert!((lum.get(2, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reconstruct_matches_luminance() {
        let lum = Image::from_fn(32, 24, |x, y| ((x * 7 + y * 13) % 17) as f32 / 17.0);
        let parts = decompose(&lum, 2.0).unwrap();
        let back = parts.reconstruct();
        for (x, y, v) in back.pixels() {
            assert!((v - lum.get(x, y)).abs() < 1e-6, "({x},{y})");
        }
    }

    #[test]
    fn test_flat_luminance_has_zero_detail() {
        let lum = Image::from_vec(10, 10, vec![0.5f32; 100]);
        let parts = decompose(&lum, 5.0).unwrap();
        for (_, _, v) in parts.detail.pixels() {
            assert!(v.abs() < 1e-5);
        }
    }

    #[test]
    fn test_detail_peaks_at_step() {
        let lum = Image::from_fn(40, 10, |x, _| if x >= 20 { 1.0f32 } else { 0.0 });
        let parts = decompose(&lum, 2.0).unwrap();
        assert!(parts.detail.get(20, 5) > 0.2);
        assert!(parts.detail.get(19, 5) < -0.2);
        assert!(parts.detail.get(2, 5).abs() < 1e-3);
    }

    #[test]
    fn test_huge_sigma_is_finite() {
        let lum = Image::from_fn(16, 12, |x, y| ((x + y) % 5) as f32 / 4.0);
        for sigma in [1e12f32, 1e20, f32::MAX] {
            let parts = decompose(&lum, sigma).unwrap();
            assert!(parts.detail.pixels().all(|(_, _, v)| v.is_finite()), "sigma {sigma}");
        }
    }

    #[test]
    fn test_invalid_sigma_rejected() {
        let lum = Image::from_vec(4, 4, vec![0.0f32; 16]);
        for sigma in [0.0f32, -1.0, f32::NAN, f32::INFINITY] {
            assert!(
                matches!(decompose(&lum, sigma), Err(FusionError::InvalidParameter { name: "blur_sigma", .. })),
                "sigma {sigma} accepted"
            );
        }
    }
}
