//! Image thumbnailing in pure Rust, no external tools.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Thumbnail** | `DynamicImage::resize_exact` (Lanczos3), saved as PNG |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining dimension math + backend

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{create_thumbnail, plan_thumbnail, scaled_dimensions};
pub use params::{Scale, ThumbnailParams};
pub use rust_backend::RustBackend;
