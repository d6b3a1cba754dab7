// convert.rs — Sample-format conversions between image types.
//
//   u8  → f32 normalized to [0, 1]          (optical channels)
//   f32 → u8 denormalized from [0, 1]       (luminance → 8-bit for Canny)
//   RgbImage → RgbPlanes                     (interleaved u8 → planar f32)
//   RgbPlanes → luma                         (BT.601 weights)
//
// Note: `Pixel::to_f32` is a RAW conversion (u8 42 → 42.0). The functions
// here do NORMALIZED conversion (u8 42 → 0.1647...).

use crate::image::Image;
use crate::rgb::{RgbImage, RgbPlanes};

/// ITU-R BT.601 luma weights for R, G, B.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Convert an Image<u8> to Image<f32> with values in [0.0, 1.0].
/// u8 0 → 0.0, u8 255 → 1.0.
pub fn u8_to_f32_normalized(src: &Image<u8>) -> Image<f32> {
    src.map(|v| v as f32 / 255.0)
}

/// Convert an Image<f32> (assumed [0.0, 1.0]) to Image<u8>.
/// Computes `round(clip(v * 255, 0, 255))`; NaN maps to 0.
pub fn f32_normalized_to_u8(src: &Image<f32>) -> Image<u8> {
    src.map(|v| (v * 255.0).clamp(0.0, 255.0).round() as u8)
}

/// Split an interleaved RGB image into three normalized f32 planes.
pub fn rgb_to_planes(src: &RgbImage) -> RgbPlanes {
    RgbPlanes {
        r: u8_to_f32_normalized(&src.channel(0)),
        g: u8_to_f32_normalized(&src.channel(1)),
        b: u8_to_f32_normalized(&src.channel(2)),
    }
}

/// Grayscale from RGB stored as 3 separate channel images.
/// Uses ITU-R BT.601 luma coefficients: Y = 0.299*R + 0.587*G + 0.114*B
///
/// # Panics
/// Panics if the three planes differ in size.
pub fn rgb_to_grayscale(r: &Image<f32>, g: &Image<f32>, b: &Image<f32>) -> Image<f32> {
    assert_eq!(r.dimensions(), g.dimensions());
    assert_eq!(r.dimensions(), b.dimensions());

    let [wr, wg, wb] = LUMA_WEIGHTS;
    let mut gray = Image::new(r.width(), r.height());
    for y in 0..r.height() {
        for x in 0..r.width() {
            let luma = wr * r.get(x, y) + wg * g.get(x, y) + wb * b.get(x, y);
            gray.set(x, y, luma);
        }
    }
    gray
}
