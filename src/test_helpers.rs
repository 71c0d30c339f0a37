//! Shared test utilities for the example-gallery test suite.
//!
//! Provides fixture writers for example trees and PNG files, and readers for
//! generated pages.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let examples = write_examples(&["a/ex1.py", "a/ex2.py", "b/ex3.py"]);
//! // ... run a stage over examples.path() ...
//! let index = read_page(&rst_dir, "a/index.rst");
//! assert_eq!(toctree_entries(&index), vec!["ex1", "ex2"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Write an examples tree into a fresh temp directory.
///
/// Each file gets a one-line body naming itself, so inlined sources are
/// distinguishable.
pub fn write_examples(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for rel in files {
        let path = tmp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("# {rel}\n")).unwrap();
    }
    tmp
}

/// Write a solid-color RGB PNG of the given size, creating parent dirs.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Page readers
// =========================================================================

/// Read a generated page by its path relative to `rst_dir`.
pub fn read_page(rst_dir: &Path, rel: &str) -> String {
    let path = rst_dir.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// Entries of the toctree on an index page, in order.
pub fn toctree_entries(page: &str) -> Vec<String> {
    let Some(start) = page.find(".. toctree::") else {
        return Vec::new();
    };
    page[start..]
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with(':'))
        .map(str::to_string)
        .collect()
}

/// File names directly inside `dir`, sorted. Empty if `dir` is missing.
pub fn file_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
