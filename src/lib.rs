// thermal_fusion: guided detail injection for optical + thermal imagery.
//
// A low-resolution single-band thermal frame is upsampled to the resolution
// of a co-registered optical RGB frame, and the optical frame's
// high-frequency detail is injected into it wherever the optical edges and
// gradients say there is structure. The result is returned both as a
// normalized thermal band and as a colormapped RGB rendering.
//
// Stage modules, in pipeline order:
//   normalize → resample → guidance → mask (canny, morphology) → inject, colormap
// `fusion` wires them together.

pub mod image;
pub mod rgb;
pub mod error;
pub mod convert;
pub mod convolution;
pub mod gradient;
pub mod normalize;
pub mod resample;
pub mod guidance;
pub mod canny;
pub mod morphology;
pub mod mask;
pub mod inject;
pub mod colormap;
pub mod fusion;

pub use colormap::{Colormap, Grayscale, Inferno, Viridis};
pub use error::{FusionError, Result};
pub use fusion::{guided_detail_injection, Fusion, FusionOutput, FusionParams};
pub use image::{Image, Pixel};
pub use normalize::ThermalScaling;
pub use rgb::RgbImage;
