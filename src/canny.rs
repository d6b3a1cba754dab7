// canny.rs — Canny edge detector on 8-bit images.
//
// Pipeline:
//   1. 3×3 Sobel gradients (gradient.rs, clamp borders)
//   2. L1 magnitude |gx| + |gy|
//   3. Non-maximum suppression along the gradient direction, quantized to
//      four sectors (horizontal, vertical, two diagonals) via tan(22.5°)
//   4. Double threshold + hysteresis: pixels above `high` seed edges,
//      pixels above `low` join when 8-connected to an edge
//
// There is no Gaussian pre-blur: the caller's image is detected as-is.
// Thresholds are in gradient units of the 8-bit input (a clean 0 → 255
// step gives an L1 magnitude of 1020).

use crate::gradient::sobel_xy;
use crate::image::Image;

/// tan(22.5°), the sector boundary for direction quantization.
const TAN_22_5: f32 = 0.414_213_57;

/// Pixel classification after non-maximum suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Suppressed,
    Weak,
    Strong,
}

/// Run Canny edge detection. Returns a binary image: 255 on edges, 0 elsewhere.
///
/// If `low > high` the thresholds are swapped.
pub fn detect_edges(src: &Image<u8>, low: f32, high: f32) -> Image<u8> {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let w = src.width();
    let h = src.height();
    let mut edges = Image::<u8>::new(w, h);
    if w == 0 || h == 0 {
        return edges;
    }

    let (gx, gy) = sobel_xy(src);
    let mag = gx.zip_map(&gy, |a, b| a.abs() + b.abs());

    // Out-of-image neighbors count as zero magnitude.
    let m_at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0.0
        } else {
            mag.get(x as usize, y as usize)
        }
    };

    let mut class = vec![Class::Suppressed; w * h];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let m = mag.get(x, y);
            if m <= low {
                continue;
            }
            let dx = gx.get(x, y);
            let dy = gy.get(x, y);
            let ax = dx.abs();
            let ay = dy.abs();
            let (xi, yi) = (x as isize, y as isize);

            let tg22 = ax * TAN_22_5;
            let is_max = if ay < tg22 {
                // Gradient mostly horizontal → compare left/right.
                m > m_at(xi - 1, yi) && m >= m_at(xi + 1, yi)
            } else if ay > tg22 + 2.0 * ax {
                // tan(67.5°) = tan(22.5°) + 2 → mostly vertical.
                m > m_at(xi, yi - 1) && m >= m_at(xi, yi + 1)
            } else {
                let s: isize = if (dx < 0.0) != (dy < 0.0) { -1 } else { 1 };
                m > m_at(xi - s, yi - 1) && m > m_at(xi + s, yi + 1)
            };
            if !is_max {
                continue;
            }

            if m > high {
                class[y * w + x] = Class::Strong;
                stack.push((x, y));
            } else {
                class[y * w + x] = Class::Weak;
            }
        }
    }

    // Hysteresis: grow from strong seeds through weak pixels.
    while let Some((x, y)) = stack.pop() {
        edges.set(x, y, 255);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let i = ny * w + nx;
                if class[i] == Class::Weak {
                    class[i] = Class::Strong;
                    stack.push((nx, ny));
                }
            }
        }
    }
    edges
}

/// Number of edge pixels in a binary edge map.
pub fn count_edges(edges: &Image<u8>) -> usize {
    edges.as_slice().iter().filter(|&&v| v > 0).count()
}
