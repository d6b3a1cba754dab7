// normalize.rs — Stage 1: bring optical and thermal samples into [0, 1].
//
// Optical input is always 8-bit, so it is a plain divide by 255.
//
// Thermal input is the awkward one. A decoded 8-bit frame, a radiometric
// u16 frame and an already-normalized float frame all look like "one band
// of numbers". `ThermalScaling` makes the choice explicit; `Auto` keeps the
// observed-range rule (max > 2 means raw counts) for callers that cannot
// know in advance.

use tracing::{debug, warn};

use crate::convert::rgb_to_planes;
use crate::error::{ensure_non_empty, Result};
use crate::image::{Image, Pixel};
use crate::rgb::{RgbImage, RgbPlanes};

/// Guard added to the min-max denominator so a constant frame maps to 0.
pub const MINMAX_EPSILON: f32 = 1e-8;

/// Observed maximum above which `ThermalScaling::Auto` treats the input as
/// raw (unnormalized) values.
pub const AUTO_RAW_THRESHOLD: f32 = 2.0;

/// How to map thermal samples into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThermalScaling {
    /// Min-max if the observed maximum exceeds 2.0, otherwise clip.
    #[default]
    Auto,
    /// Always `(x - min) / (max - min + ε)`.
    MinMax,
    /// Input is already normalized: clip to [0, 1].
    Normalized,
}

/// Normalize an 8-bit RGB optical image to planar f32 in [0, 1].
pub fn normalize_optical(optical: &RgbImage) -> Result<RgbPlanes> {
    ensure_non_empty("optical", optical.width(), optical.height())?;
    Ok(rgb_to_planes(optical))
}

/// Normalize a single-band thermal image to f32 in [0, 1].
///
/// Non-finite samples (possible with float input) are replaced by 0 before
/// scaling and do not take part in the min/max.
pub fn normalize_thermal<T: Pixel>(thermal: &Image<T>, scaling: ThermalScaling) -> Result<Image<f32>> {
    ensure_non_empty("thermal", thermal.width(), thermal.height())?;

    let mut raw = thermal.map(|v| v.to_f32());
    let non_finite = raw.as_slice().iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        warn!(non_finite, "thermal input contains non-finite samples; treating them as 0");
        for v in raw.as_mut_slice() {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
    }

    // Non-empty and all finite, so min_max() is Some.
    let (lo, hi) = raw.min_max().unwrap_or((0.0, 0.0));

    let use_minmax = match scaling {
        ThermalScaling::Auto => hi > AUTO_RAW_THRESHOLD,
        ThermalScaling::MinMax => true,
        ThermalScaling::Normalized => false,
    };
    debug!(?scaling, min = lo, max = hi, use_minmax, "normalizing thermal");

    if use_minmax {
        let denom = hi - lo + MINMAX_EPSILON;
        Ok(raw.map(|v| ((v - lo) / denom).clamp(0.0, 1.0)))
    } else {
        raw.clamp_in_place(0.0, 1.0);
        Ok(raw)
    }
}
