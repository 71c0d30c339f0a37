//! Shared types used across all pipeline stages.
//!
//! [`Example`] is the join key between stages: the image stage, the
//! thumbnail stage and the page stage all derive their file names from
//! [`Example::relative`] through [`crate::naming`].

use crate::naming;
use std::path::{Path, PathBuf};

/// An example script discovered under the examples root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// Absolute (or root-joined) path to the script.
    pub path: PathBuf,
    /// Path relative to the examples root, `/`-separated (`a/ex1.py`).
    pub relative: String,
}

impl Example {
    pub fn new(path: PathBuf, relative: String) -> Self {
        Self { path, relative }
    }

    /// Directory group key: the relative parent directory, `""` at top level.
    pub fn group(&self) -> &str {
        match self.relative.rfind('/') {
            Some(slash) => &self.relative[..slash],
            None => "",
        }
    }

    /// File name of the script (`ex1.py`).
    pub fn file_name(&self) -> &str {
        match self.relative.rfind('/') {
            Some(slash) => &self.relative[slash + 1..],
            None => &self.relative,
        }
    }

    /// Flattened figure base (`a/ex1.py` → `a-ex1`).
    pub fn figure_base(&self) -> String {
        naming::figure_base(&self.relative)
    }

    /// Where this example's rendered image lives.
    pub fn image_path(&self, images_dir: &Path) -> PathBuf {
        naming::image_path_for(&self.relative, images_dir)
    }
}
