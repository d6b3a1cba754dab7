// rgb.rs — Three-channel images: interleaved 8-bit RGB and planar f32 RGB.
//
// `RgbImage` is the on-the-wire form on both ends of the pipeline: the
// optical input arrives as one, and the colorized result leaves as one.
// Its buffer layout (row-major, R G B interleaved) matches what image
// decoders hand out, so callers can move a decoded buffer in without
// copying.
//
// `RgbPlanes` is the working form after normalization: three separate
// `Image<f32>` planes in [0, 1], which is what the luma computation in
// convert.rs consumes.

use crate::image::Image;

/// An interleaved 8-bit RGB image (H×W×3).
#[derive(Clone, PartialEq, Eq)]
pub struct RgbImage {
    /// Row-major samples, three per pixel. Length = width * height * 3.
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl RgbImage {
    /// Create a black image.
    pub fn new(width: usize, height: usize) -> Self {
        RgbImage {
            data: vec![0; width * height * 3],
            width,
            height,
        }
    }

    /// Wrap an interleaved RGB buffer.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height * 3`.
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width * height * 3,
            "data length ({}) must equal width * height * 3 ({})",
            data.len(),
            width * height * 3,
        );
        RgbImage { data, width, height }
    }

    /// Fill every pixel with the same color.
    pub fn from_pixel(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        RgbImage { data, width, height }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// True when either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The `[r, g, b]` triple at (x, y).
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Overwrite the pixel at (x, y).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// The raw interleaved buffer.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image, returning the raw interleaved buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Extract one channel (0 = R, 1 = G, 2 = B) as a single-band image.
    ///
    /// # Panics
    /// Panics if `channel > 2`.
    pub fn channel(&self, channel: usize) -> Image<u8> {
        assert!(channel < 3, "channel index {channel} out of range (0..3)");
        let data = self.data.iter().skip(channel).step_by(3).copied().collect();
        Image::from_vec(self.width, self.height, data)
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x},{y}) out of bounds for image {}×{}",
            self.width,
            self.height,
        );
        (y * self.width + x) * 3
    }
}

impl std::fmt::Debug for RgbImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RgbImage {{ {}×{} }}", self.width, self.height)
    }
}

/// Planar f32 RGB, one `Image<f32>` per channel.
#[derive(Clone, Debug)]
pub struct RgbPlanes {
    pub r: Image<f32>,
    pub g: Image<f32>,
    pub b: Image<f32>,
}

impl RgbPlanes {
    #[inline]
    pub fn width(&self) -> usize {
        self.r.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.r.height()
    }
}
