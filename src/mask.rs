// mask.rs — Stage 4: where, and how strongly, to inject optical detail.
//
//   edge  = dilate(canny(u8(lum), 50, 150), ellipse(k)) / 255      ∈ {0, 1}
//   soft  = clip(2 · |∇lum| / (max|∇lum| + ε), 0, 1)                ∈ [0, 1]
//   mask  = clip(edge + 0.6 · soft, 0, 1)
//
// The edge term gives full strength on crisp structure; the soft term lets
// weaker gradients through proportionally so textured regions are not
// all-or-nothing.

use tracing::debug;

use crate::canny::{count_edges, detect_edges};
use crate::convert::f32_normalized_to_u8;
use crate::error::{ensure_same_size, FusionError, Result};
use crate::gradient::{magnitude, sobel_xy};
use crate::image::Image;
use crate::morphology::{dilate, StructuringElement};

/// Canny hysteresis thresholds, in 8-bit gradient units.
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

/// Gain applied to the normalized gradient magnitude before clipping.
pub const SOFT_GAIN: f32 = 2.0;

/// Weight of the soft mask when combined with the edge mask.
pub const SOFT_WEIGHT: f32 = 0.6;

/// Guard for normalizing by the maximum gradient of a flat image.
pub const GRADIENT_EPSILON: f32 = 1e-8;

/// Reject structuring-element sizes below 1.
pub fn validate_dilate(dilate_size: i32) -> Result<usize> {
    if dilate_size < 1 {
        return Err(FusionError::invalid_parameter(
            "edge_dilate",
            format!("must be >= 1, got {dilate_size}"),
        ));
    }
    Ok(dilate_size as usize)
}

/// Binary edge mask from the luminance map, thickened by dilation.
///
/// Output samples are exactly 0.0 or 1.0.
pub fn edge_mask(lum: &Image<f32>, dilate_size: i32) -> Result<Image<f32>> {
    let size = validate_dilate(dilate_size)?;
    let lum8 = f32_normalized_to_u8(lum);
    let edges = detect_edges(&lum8, CANNY_LOW, CANNY_HIGH);
    let reach = lum.width().max(lum.height());
    let thick = dilate(&edges, &StructuringElement::clipped_ellipse(size, reach));
    debug!(
        edge_pixels = count_edges(&edges),
        dilated_pixels = count_edges(&thick),
        dilate_size = size,
        "built edge mask"
    );
    Ok(thick.map(|v| v as f32 / 255.0))
}

/// Soft mask from the normalized gradient magnitude of the luminance map.
pub fn soft_mask(lum: &Image<f32>) -> Image<f32> {
    let (gx, gy) = sobel_xy(lum);
    let grad = magnitude(&gx, &gy);
    let max = grad.min_max().map_or(0.0, |(_, hi)| hi);
    let scale = SOFT_GAIN / (max + GRADIENT_EPSILON);
    debug!(max_gradient = max, "built soft mask");
    grad.map(|g| (g * scale).clamp(0.0, 1.0))
}

/// `clip(edge + 0.6 · soft, 0, 1)`.
pub fn combine(edge: &Image<f32>, soft: &Image<f32>) -> Result<Image<f32>> {
    ensure_same_size(edge.dimensions(), soft.dimensions())?;
    Ok(edge.zip_map(soft, |e, s| (e + SOFT_WEIGHT * s).clamp(0.0, 1.0)))
}
