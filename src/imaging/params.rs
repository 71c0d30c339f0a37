//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what images to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Scale`]: linear scale factor in `(0, 1]`, default 0.3. Clamped on construction.
//! - [`ThumbnailParams`]: everything a thumbnail needs: source, output, target dimensions.

use std::path::PathBuf;

/// Smallest scale factor a thumbnail may use.
const MIN_SCALE: f64 = 0.01;

/// Linear scale factor applied to both image dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(MIN_SCALE, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(0.3)
    }
}

/// Parameters for a thumbnail operation (plain downscale, aspect preserved).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}
