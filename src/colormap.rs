// colormap.rs — Scalar → RGB palettes for rendering the fused thermal band.
//
// A palette is anything implementing `Colormap`. The built-in ones are
// piecewise-linear over anchor tables sampled every 0.1 from the
// matplotlib originals; closures `Fn(f32) -> [f32; 3]` work too, so a
// caller can swap palettes without touching the injection math.

use crate::image::Image;
use crate::rgb::RgbImage;

/// Maps an intensity in [0, 1] to an RGB triple in [0, 1].
pub trait Colormap: Send + Sync {
    /// Color for intensity `t`. Implementations may assume `t ∈ [0, 1]`;
    /// `colorize` clamps before calling.
    fn rgb(&self, t: f32) -> [f32; 3];
}

impl<F> Colormap for F
where
    F: Fn(f32) -> [f32; 3] + Send + Sync,
{
    fn rgb(&self, t: f32) -> [f32; 3] {
        self(t)
    }
}

/// Linear interpolation through evenly spaced anchors covering [0, 1].
fn lerp_anchors(anchors: &[[f32; 3]], t: f32) -> [f32; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let segments = anchors.len() - 1;
    let pos = t * segments as f32;
    let i = (pos.floor() as usize).min(segments - 1);
    let frac = pos - i as f32;
    let (a, b) = (anchors[i], anchors[i + 1]);
    [
        a[0] + frac * (b[0] - a[0]),
        a[1] + frac * (b[1] - a[1]),
        a[2] + frac * (b[2] - a[2]),
    ]
}

const INFERNO: [[f32; 3]; 11] = [
    [0.001462, 0.000466, 0.013866],
    [0.087411, 0.044556, 0.224813],
    [0.258234, 0.038571, 0.406485],
    [0.416331, 0.090203, 0.432943],
    [0.578304, 0.148039, 0.404411],
    [0.735683, 0.215906, 0.330245],
    [0.865006, 0.316822, 0.226055],
    [0.954506, 0.468744, 0.099874],
    [0.987622, 0.645320, 0.039886],
    [0.964394, 0.843848, 0.273391],
    [0.988362, 0.998364, 0.644924],
];

const VIRIDIS: [[f32; 3]; 11] = [
    [0.267004, 0.004874, 0.329415],
    [0.282623, 0.140926, 0.457517],
    [0.253935, 0.265254, 0.529983],
    [0.206756, 0.371758, 0.553117],
    [0.163625, 0.471133, 0.558148],
    [0.127568, 0.566949, 0.550556],
    [0.134692, 0.658636, 0.517649],
    [0.266941, 0.748751, 0.440573],
    [0.477504, 0.821444, 0.318195],
    [0.741388, 0.873449, 0.149561],
    [0.993248, 0.906157, 0.143936],
];

/// Black → purple → orange → pale yellow. The default thermal palette.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inferno;

impl Colormap for Inferno {
    fn rgb(&self, t: f32) -> [f32; 3] {
        lerp_anchors(&INFERNO, t)
    }
}

/// Purple → teal → yellow.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viridis;

impl Colormap for Viridis {
    fn rgb(&self, t: f32) -> [f32; 3] {
        lerp_anchors(&VIRIDIS, t)
    }
}

/// Black → white.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl Colormap for Grayscale {
    fn rgb(&self, t: f32) -> [f32; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        [t, t, t]
    }
}

/// Render a scalar image through `cmap` as 8-bit RGB.
///
/// Input is clamped to [0, 1] (NaN → 0); each channel is scaled by 255,
/// rounded and clipped.
pub fn colorize(img: &Image<f32>, cmap: &dyn Colormap) -> RgbImage {
    let mut data = Vec::with_capacity(img.width() * img.height() * 3);
    for &v in img.as_slice() {
        let t = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        for c in cmap.rgb(t) {
            data.push((c * 255.0).clamp(0.0, 255.0).round() as u8);
        }
    }
    RgbImage::from_vec(img.width(), img.height(), data)
}
