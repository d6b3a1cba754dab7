// morphology.rs — Structuring elements and grayscale dilation.
//
// The edge mask is thickened with an elliptical element so that injected
// detail covers a few pixels on either side of each Canny line instead of
// a single-pixel trace.
//
// Ellipse rasterization (size k, anchor at k/2 in both axes):
//
//   r = c = k / 2
//   for each row i:  dy = i - r
//                    dx = round(c * sqrt((r² - dy²) / r²))
//                    row i is set on columns [c - dx, c + dx]
//
// k = 1 → single pixel, k = 3 → 3×3 cross, k = 5:
//
//   . . # . .
//   # # # # #      <- rows ±1: dx = round(2·√0.75) = 2 → full width
//   # # # # #
//   # # # # #
//   . . # . .

use crate::image::Image;

/// A binary structuring element with its anchor at the center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: usize,
    height: usize,
    mask: Vec<bool>,
}

impl StructuringElement {
    /// Elliptical element inscribed in a `size × size` box.
    ///
    /// # Panics
    /// Panics if `size == 0`. The mask builder validates the size first.
    pub fn ellipse(size: usize) -> Self {
        Self::clipped_ellipse(size, size)
    }

    /// Elliptical element of side `size`, keeping only the cells within
    /// `reach` of the anchor along each axis.
    ///
    /// Dilating an image whose sides are at most `reach` gives the same
    /// result as with the full element, since no other cell can land
    /// inside the image. Storage is `(2·min(size/2, reach) + 1)²`, so
    /// arbitrarily large sizes are cheap on small images.
    ///
    /// # Panics
    /// Panics if `size == 0`.
    pub fn clipped_ellipse(size: usize, reach: usize) -> Self {
        assert!(size > 0, "structuring element size must be > 0");
        let r = size / 2;
        let q = r.min(reach);
        let side = 2 * q + 1;
        let rf = r as f64;
        let inv_r2 = if r > 0 { 1.0 / (rf * rf) } else { 0.0 };
        let (r, q, size) = (r as i64, q as i64, size as i64);

        let mut mask = vec![false; side * side];
        for dy in -q..=q {
            // Row of the full size × size box this offset falls on.
            let i = dy + r;
            if i < 0 || i >= size {
                continue;
            }
            let dyf = dy as f64;
            let dx = (rf * ((rf * rf - dyf * dyf) * inv_r2).sqrt()).round() as i64;
            let j1 = (r - dx).max(0);
            let j2 = (r + dx + 1).min(size);
            for ox in -q..=q {
                let j = ox + r;
                if j >= j1 && j < j2 {
                    mask[((dy + q) * side as i64 + ox + q) as usize] = true;
                }
            }
        }
        StructuringElement {
            width: side,
            height: side,
            mask,
        }
    }

    /// Full rectangle of the given size.
    pub fn rect(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "structuring element size must be > 0");
        StructuringElement {
            width,
            height,
            mask: vec![true; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether element cell (col, row) is set.
    #[inline]
    pub fn contains(&self, col: usize, row: usize) -> bool {
        self.mask[row * self.width + col]
    }

    /// Offsets `(dx, dy)` of every set cell, relative to the anchor.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let ax = (self.width / 2) as isize;
        let ay = (self.height / 2) as isize;
        let mut out = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                if self.contains(col, row) {
                    out.push((col as isize - ax, row as isize - ay));
                }
            }
        }
        out
    }
}

/// Grayscale dilation: each output pixel is the maximum of the input over
/// the element placed at that pixel. Taps outside the image are ignored.
pub fn dilate(src: &Image<u8>, element: &StructuringElement) -> Image<u8> {
    let w = src.width() as isize;
    let h = src.height() as isize;
    let offsets = element.offsets();

    Image::from_fn(src.width(), src.height(), |x, y| {
        let (x, y) = (x as isize, y as isize);
        offsets
            .iter()
            .filter_map(|&(dx, dy)| {
                let sx = x + dx;
                let sy = y + dy;
                (sx >= 0 && sy >= 0 && sx < w && sy < h).then(|| src.get(sx as usize, sy as usize))
            })
            .max()
            .unwrap_or(0)
    })
}
