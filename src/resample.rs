// resample.rs — Stage 2: bicubic resize of the thermal band.
//
// Keys cubic convolution with a = -0.75, sampled at pixel centers:
//
//   src = (dst + 0.5) * (src_len / dst_len) - 0.5
//
// so the image corners line up regardless of the scale factor. Four taps
// per axis, border taps clamp to the edge pixel (same policy as the
// convolution module).
//
// The kernel is separable, so the resize runs as two 1D passes. Tap
// indices and weights depend only on the output coordinate, so they are
// computed once per output column/row and reused for every line.

use tracing::debug;

use crate::error::{ensure_non_empty, Result};
use crate::image::Image;

/// Free parameter of the cubic convolution kernel.
pub const CUBIC_A: f32 = -0.75;

/// Cubic convolution kernel evaluated at distance `x`.
#[inline]
fn cubic_weight(x: f32) -> f32 {
    let a = CUBIC_A;
    let x = x.abs();
    if x <= 1.0 {
        ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a
    } else {
        0.0
    }
}

/// Four source indices and their weights for one output coordinate.
#[derive(Debug, Clone, Copy)]
struct Taps {
    idx: [usize; 4],
    weight: [f32; 4],
}

/// Precompute taps for every output coordinate along one axis.
fn axis_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len as isize - 1;
    (0..dst_len)
        .map(|d| {
            let f = (d as f32 + 0.5) * scale - 0.5;
            let i0 = f.floor();
            let t = f - i0;
            let i0 = i0 as isize;
            let mut idx = [0usize; 4];
            let mut weight = [0.0f32; 4];
            for k in 0..4 {
                let offset = k as isize - 1;
                idx[k] = (i0 + offset).clamp(0, last) as usize;
                weight[k] = cubic_weight(t - offset as f32);
            }
            Taps { idx, weight }
        })
        .collect()
}

/// Resize `src` to exactly `target_w × target_h` with bicubic interpolation.
///
/// Works for upsampling and downsampling alike. The output is not clamped:
/// cubic interpolation can overshoot near steps.
pub fn resize_bicubic(src: &Image<f32>, target_w: usize, target_h: usize) -> Result<Image<f32>> {
    ensure_non_empty("resample source", src.width(), src.height())?;
    ensure_non_empty("resample target", target_w, target_h)?;

    if src.dimensions() == (target_w, target_h) {
        return Ok(src.clone());
    }

    let x_taps = axis_taps(src.width(), target_w);
    let y_taps = axis_taps(src.height(), target_h);

    // Horizontal pass: src.height() rows × target_w columns.
    let mut horiz = Image::<f32>::new(target_w, src.height());
    for y in 0..src.height() {
        let row = src.row(y);
        let out = horiz.row_mut(y);
        for (o, taps) in out.iter_mut().zip(&x_taps) {
            *o = taps
                .idx
                .iter()
                .zip(&taps.weight)
                .map(|(&i, &w)| row[i] * w)
                .sum();
        }
    }

    // Vertical pass.
    let mut dst = Image::<f32>::new(target_w, target_h);
    for (y, taps) in y_taps.iter().enumerate() {
        for x in 0..target_w {
            let mut acc = 0.0f32;
            for (&i, &w) in taps.idx.iter().zip(&taps.weight) {
                // SAFETY: tap indices are clamped to [0, src.height()), x < target_w.
                acc += unsafe { horiz.get_unchecked(x, i) } * w;
            }
            // SAFETY: y < target_h, x < target_w.
            unsafe { dst.set_unchecked(x, y, acc) };
        }
    }
    Ok(dst)
}

/// Upsample a normalized thermal band to the optical resolution.
///
/// Bicubic resize followed by a clamp back into [0, 1], so overshoot at
/// hot/cold boundaries never leaves the normalized range.
pub fn upsample_thermal(thermal: &Image<f32>, target_w: usize, target_h: usize) -> Result<Image<f32>> {
    let mut up = resize_bicubic(thermal, target_w, target_h)?;
    up.clamp_in_place(0.0, 1.0);
    debug!(
        from_w = thermal.width(),
        from_h = thermal.height(),
        to_w = target_w,
        to_h = target_h,
        "upsampled thermal"
    );
    Ok(up)
}
