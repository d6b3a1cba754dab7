// fusion.rs — The guided detail injection pipeline.
//
// Ties the five stages together, strictly forward:
//
//   1. Normalize optical (÷255) and thermal (ThermalScaling) into [0, 1]
//   2. Bicubic-upsample thermal to the optical resolution
//   3. Luminance → Gaussian base + detail
//   4. Edge mask + soft mask → combined mask
//   5. Inject scaled detail into the thermal band, clip, colorize
//
// `Fusion` holds nothing but parameters and a palette, so one instance can
// serve any number of calls (and threads); every call allocates its own
// buffers.

use tracing::{debug, info};

use crate::colormap::{colorize, Colormap, Inferno};
use crate::error::{ensure_non_empty, Result};
use crate::guidance::{decompose, luminance, validate_sigma};
use crate::image::{Image, Pixel};
use crate::inject::{inject, validate_alpha};
use crate::mask::{combine, edge_mask, soft_mask, validate_dilate};
use crate::normalize::{normalize_optical, normalize_thermal, ThermalScaling};
use crate::resample::upsample_thermal;
use crate::rgb::RgbImage;

/// Default blend strength.
pub const DEFAULT_ALPHA: f32 = 0.9;
/// Default Gaussian sigma for the base/detail split.
pub const DEFAULT_BLUR_SIGMA: f32 = 5.0;
/// Default side of the elliptical dilation element.
pub const DEFAULT_EDGE_DILATE: i32 = 3;

/// Fusion parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionParams {
    /// Blend strength of the injected detail. Must be finite and >= 0;
    /// 0 disables injection.
    pub alpha: f32,
    /// Sigma of the Gaussian that separates base from detail. Must be > 0.
    pub blur_sigma: f32,
    /// Side of the elliptical dilation element for the edge mask. Must be >= 1.
    pub edge_dilate: i32,
    /// How thermal samples are mapped into [0, 1].
    pub thermal_scaling: ThermalScaling,
}

impl Default for FusionParams {
    fn default() -> Self {
        FusionParams {
            alpha: DEFAULT_ALPHA,
            blur_sigma: DEFAULT_BLUR_SIGMA,
            edge_dilate: DEFAULT_EDGE_DILATE,
            thermal_scaling: ThermalScaling::Auto,
        }
    }
}

impl FusionParams {
    /// Build parameters from untrusted text fields (form values, CLI
    /// arguments). A missing, unparseable or non-finite value falls back to
    /// its default; `edge_dilate` must be an integer literal ("3.5" falls
    /// back). Range checks are left to `validate`.
    pub fn from_form(alpha: Option<&str>, blur_sigma: Option<&str>, edge_dilate: Option<&str>) -> Self {
        fn parse_f32(field: Option<&str>, default: f32) -> f32 {
            field
                .and_then(|s| s.trim().parse::<f32>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        }

        FusionParams {
            alpha: parse_f32(alpha, DEFAULT_ALPHA),
            blur_sigma: parse_f32(blur_sigma, DEFAULT_BLUR_SIGMA),
            edge_dilate: edge_dilate
                .and_then(|s| s.trim().parse::<i32>().ok())
                .unwrap_or(DEFAULT_EDGE_DILATE),
            thermal_scaling: ThermalScaling::Auto,
        }
    }

    /// Check every parameter against its valid domain.
    pub fn validate(&self) -> Result<()> {
        validate_alpha(self.alpha)?;
        validate_sigma(self.blur_sigma)?;
        validate_dilate(self.edge_dilate)?;
        Ok(())
    }
}

/// Result of one fusion call.
#[derive(Debug, Clone)]
pub struct FusionOutput {
    /// Colormapped visualization, same size as the optical input.
    pub rgb: RgbImage,
    /// Fused thermal intensity in [0, 1]; the authoritative result.
    pub thermal: Image<f32>,
    /// Combined injection mask in [0, 1].
    pub mask: Image<f32>,
}

impl FusionOutput {
    /// `(rgb, thermal, mask)`.
    pub fn into_parts(self) -> (RgbImage, Image<f32>, Image<f32>) {
        (self.rgb, self.thermal, self.mask)
    }
}

/// Stateless fusion pipeline: parameters plus a palette.
pub struct Fusion {
    params: FusionParams,
    colormap: Box<dyn Colormap>,
}

impl Default for Fusion {
    fn default() -> Self {
        Fusion::new(FusionParams::default())
    }
}

impl std::fmt::Debug for Fusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fusion")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Fusion {
    /// Pipeline rendering with the Inferno palette.
    pub fn new(params: FusionParams) -> Self {
        Fusion::with_colormap(params, Inferno)
    }

    /// Pipeline rendering with a caller-supplied palette.
    pub fn with_colormap(params: FusionParams, colormap: impl Colormap + 'static) -> Self {
        Fusion {
            params,
            colormap: Box::new(colormap),
        }
    }

    pub fn params(&self) -> &FusionParams {
        &self.params
    }

    /// Fuse one optical/thermal pair.
    ///
    /// The thermal band may be any resolution; it is resampled to the
    /// optical size. Fails fast on empty inputs or invalid parameters,
    /// before any image work is done.
    pub fn fuse<T: Pixel>(&self, optical: &RgbImage, thermal: &Image<T>) -> Result<FusionOutput> {
        ensure_non_empty("optical", optical.width(), optical.height())?;
        ensure_non_empty("thermal", thermal.width(), thermal.height())?;
        self.params.validate()?;

        let (w, h) = optical.dimensions();
        debug!(
            optical_w = w,
            optical_h = h,
            thermal_w = thermal.width(),
            thermal_h = thermal.height(),
            params = ?self.params,
            "starting fusion"
        );

        // 1. Normalize.
        let rgb = normalize_optical(optical)?;
        let thermal_norm = normalize_thermal(thermal, self.params.thermal_scaling)?;

        // 2. Resample.
        let thermal_up = upsample_thermal(&thermal_norm, w, h)?;

        // 3. Guidance.
        let lum = luminance(&rgb);
        let parts = decompose(&lum, self.params.blur_sigma)?;

        // 4. Masks.
        let edge = edge_mask(&lum, self.params.edge_dilate)?;
        let soft = soft_mask(&lum);
        let mask = combine(&edge, &soft)?;

        // 5. Inject and render.
        let fused = inject(&thermal_up, &parts.detail, &mask, self.params.alpha)?;
        let rendered = colorize(&fused, self.colormap.as_ref());

        info!(width = w, height = h, alpha = self.params.alpha, "fusion complete");
        Ok(FusionOutput {
            rgb: rendered,
            thermal: fused,
            mask,
        })
    }
}

/// One-shot fusion with the default Inferno palette.
pub fn guided_detail_injection<T: Pixel>(
    optical: &RgbImage,
    thermal: &Image<T>,
    params: &FusionParams,
) -> Result<FusionOutput> {
    Fusion::new(*params).fuse(optical, thermal)
}
