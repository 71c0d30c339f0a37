//! High-level image operations.
//!
//! These functions combine dimension math with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Scale, ThumbnailParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Dimensions of a copy scaled by `scale`, rounded, never below 1px.
pub fn scaled_dimensions(original: Dimensions, scale: Scale) -> Dimensions {
    let apply = |v: u32| ((f64::from(v) * scale.value()).round() as u32).max(1);
    Dimensions {
        width: apply(original.width),
        height: apply(original.height),
    }
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(
    source: &Path,
    output: &Path,
    original: Dimensions,
    scale: Scale,
) -> ThumbnailParams {
    let Dimensions { width, height } = scaled_dimensions(original, scale);
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
    }
}

/// Write a scaled copy of `source` to `output`.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    scale: Scale,
) -> Result<ThumbnailParams> {
    let original = backend.identify(source)?;
    let params = plan_thumbnail(source, output, original, scale);
    backend.thumbnail(&params)?;
    Ok(params)
}
