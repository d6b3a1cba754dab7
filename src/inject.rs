// inject.rs — Stage 5a: add mask-weighted optical detail to the thermal band.
//
//   σ      = std(detail)            (population; 1.0 if σ < 1e-8)
//   scaled = detail / σ · 0.05
//   fused  = clip(thermal_up + alpha · scaled · mask, 0, 1)
//
// Normalizing by σ makes the injected amplitude independent of the optical
// image's contrast; the 0.05 factor caps a one-sigma detail at 5% of the
// thermal range before alpha and the mask are applied.

use tracing::debug;

use crate::error::{ensure_same_size, FusionError, Result};
use crate::image::Image;

/// Amplitude of a one-standard-deviation detail after scaling.
pub const DETAIL_AMPLITUDE: f32 = 0.05;

/// Below this standard deviation the detail layer is treated as flat.
pub const DETAIL_STD_FLOOR: f32 = 1e-8;

/// Reject blend strengths that are negative or non-finite.
pub fn validate_alpha(alpha: f32) -> Result<()> {
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(FusionError::invalid_parameter(
            "alpha",
            format!("must be finite and >= 0, got {alpha}"),
        ));
    }
    Ok(())
}

/// Scale a detail layer to unit standard deviation times `DETAIL_AMPLITUDE`.
///
/// Returns the scaled layer and the divisor that was used (the measured
/// standard deviation, or 1.0 for a flat layer).
pub fn scale_detail(detail: &Image<f32>) -> (Image<f32>, f32) {
    let (_, std) = detail.mean_std();
    let divisor = if std < DETAIL_STD_FLOOR || !std.is_finite() { 1.0 } else { std };
    debug!(detail_std = std, substituted = divisor != std, "scaling detail");
    (detail.map(|d| d / divisor * DETAIL_AMPLITUDE), divisor)
}

/// Inject `detail` into `thermal_up`, weighted by `mask` and `alpha`.
///
/// All three images must share the same dimensions.
pub fn inject(
    thermal_up: &Image<f32>,
    detail: &Image<f32>,
    mask: &Image<f32>,
    alpha: f32,
) -> Result<Image<f32>> {
    validate_alpha(alpha)?;
    ensure_same_size(thermal_up.dimensions(), detail.dimensions())?;
    ensure_same_size(thermal_up.dimensions(), mask.dimensions())?;

    let (scaled, _) = scale_detail(detail);
    // Bounded factors first: a zero mask gives an exact 0 for any alpha.
    let weighted = scaled.zip_map(mask, |d, m| d * m * alpha);
    Ok(thermal_up.zip_map(&weighted, |t, w| {
        let v = t + w;
        if v.is_nan() { t.clamp(0.0, 1.0) } else { v.clamp(0.0, 1.0) }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_detail_unit_std() {
        let detail = Image::from_vec(4, 1, vec![-2.0f32, 2.0, -2.0, 2.0]);
        let (scaled, divisor) = scale_detail(&detail);
        assert!((divisor - 2.0).abs() < 1e-6);
        assert!((scaled.get(0, 0) + 0.05).abs() < 1e-6);
        assert!((scaled.get(1, 0) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_flat_detail_uses_unit_divisor() {
        let detail = Image::from_vec(3, 3, vec![0.0f32; 9]);
        let (scaled, divisor) = scale_detail(&detail);
        assert_eq!(divisor, 1.0);
        for (_, _, v) in scaled.pixels() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_inject_formula() {
        let thermal = Image::from_vec(2, 1, vec![0.5f32, 0.5]);
        let detail = Image::from_vec(2, 1, vec![-1.0f32, 1.0]); // std = 1
        let mask = Image::from_vec(2, 1, vec![1.0f32, 0.5]);
        let fused = inject(&thermal, &detail, &mask, 0.8).unwrap();
        // 0.5 + 0.8 * (-0.05) * 1.0 = 0.46 ; 0.5 + 0.8 * 0.05 * 0.5 = 0.52
        assert!((fused.get(0, 0) - 0.46).abs() < 1e-6);
        assert!((fused.get(1, 0) - 0.52).abs() < 1e-6);
    }

    #[test]
    fn test_inject_clips() {
        let thermal = Image::from_vec(2, 1, vec![0.99f32, 0.01]);
        let detail = Image::from_vec(2, 1, vec![1.0f32, -1.0]);
        let mask = Image::from_vec(2, 1, vec![1.0f32, 1.0]);
        let fused = inject(&thermal, &detail, &mask, 10.0).unwrap();
        assert_eq!(fused.get(0, 0), 1.0);
        assert_eq!(fused.get(1, 0), 0.0);
    }

    #[test]
    fn test_max_alpha_stays_finite() {
        let thermal = Image::from_vec(3, 1, vec![0.5f32, 0.5, 0.5]);
        let detail = Image::from_vec(3, 1, vec![-1.0f32, 1.0, 1.0]);
        let mask = Image::from_vec(3, 1, vec![1.0f32, 1.0, 0.0]);
        let fused = inject(&thermal, &detail, &mask, f32::MAX).unwrap();
        assert_eq!(fused.as_slice(), &[0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_zero_alpha_is_identity() {
        let thermal = Image::from_fn(5, 5, |x, y| (x + y) as f32 / 8.0);
        let detail = Image::from_fn(5, 5, |x, _| x as f32 - 2.0);
        let mask = Image::from_vec(5, 5, vec![1.0f32; 25]);
        let fused = inject(&thermal, &detail, &mask, 0.0).unwrap();
        assert_eq!(fused, thermal);
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let img = Image::from_vec(1, 1, vec![0.5f32]);
        for alpha in [-0.1f32, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                inject(&img, &img, &img, alpha),
                Err(FusionError::InvalidParameter { name: "alpha", .. })
            ));
        }
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let a = Image::from_vec(2, 2, vec![0.5f32; 4]);
        let b = Image::from_vec(2, 1, vec![0.5f32; 2]);
        assert!(matches!(inject(&a, &b, &a, 0.5), Err(FusionError::DimensionMismatch { .. })));
        assert!(matches!(inject(&a, &a, &b, 0.5), Err(FusionError::DimensionMismatch { .. })));
    }
}
