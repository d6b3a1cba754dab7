// error.rs — Error type for the fusion pipeline.
//
// Only structural problems are errors: empty images, mismatched sizes and
// parameters outside their valid domain. Degenerate-but-valid input
// (a constant thermal frame, a flat optical frame) is handled numerically
// and never reaches this type.

use thiserror::Error;

/// Errors returned by the fusion pipeline and its stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    /// An input or requested output has a zero dimension.
    #[error("invalid dimensions for {what}: {width}×{height}")]
    InvalidDimensions {
        /// Which image was rejected.
        what: &'static str,
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
    },

    /// Two images that must be the same size are not.
    #[error("dimension mismatch: expected {}×{}, got {}×{}", expected.0, expected.1, actual.0, actual.1)]
    DimensionMismatch {
        /// `(width, height)` of the reference image.
        expected: (usize, usize),
        /// `(width, height)` of the offending image.
        actual: (usize, usize),
    },

    /// A numeric parameter lies outside its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in `FusionParams`.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl FusionError {
    /// Creates an invalid dimensions error.
    #[must_use]
    pub const fn invalid_dimensions(what: &'static str, width: usize, height: usize) -> Self {
        Self::InvalidDimensions { what, width, height }
    }

    /// Creates a dimension mismatch error.
    #[must_use]
    pub const fn dimension_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for fusion operations.
pub type Result<T> = std::result::Result<T, FusionError>;

/// Fail with `InvalidDimensions` if either side of `(width, height)` is zero.
pub(crate) fn ensure_non_empty(what: &'static str, width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(FusionError::invalid_dimensions(what, width, height));
    }
    Ok(())
}

/// Fail with `DimensionMismatch` unless the two sizes are equal.
pub(crate) fn ensure_same_size(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(FusionError::dimension_mismatch(expected, actual));
    }
    Ok(())
}
