//! Centralized naming rules shared by every pipeline stage.
//!
//! An example is identified by its path relative to the examples root
//! (`a/ex1.py`). Everything the gallery produces for it is derived from that
//! one string, and every stage must derive it the same way or the generated
//! pages point at files nobody wrote:
//!
//! ```text
//! examples/a/ex1.py            example (relative path "a/ex1.py")
//! images/a-ex1.png             rendered image  (figure base "a-ex1")
//! images/thumbnails/a-ex1.png  thumbnail (same file name)
//! examples/a/ex1.rst           content page    (page name "ex1")
//! ```
//!
//! ## Flattening
//!
//! Images live in a single flat directory. The extension is stripped and every
//! directory separator becomes [`FIGURE_JOIN`], so `a/b/ex.py` becomes
//! `a-b-ex.png`. Collisions (`a/b-c.py` vs `a-b/c.py`) are rejected at scan
//! time, see [`crate::scan::check_figure_collisions`].
//!
//! ## Cross-references
//!
//! Pages reference files either "absolute-style", where the data root is
//! replaced by [`DOC_ROOT_MARKER`] (Sphinx resolves a leading `/` against the
//! documentation source root), or relative, by climbing one `..` per
//! separator left after the data root.

use crate::solver::Problem;
use std::path::{Component, Path, PathBuf};

/// Character replacing directory separators in flattened figure names.
pub const FIGURE_JOIN: char = '-';

/// Extension of rendered images and thumbnails.
pub const IMAGE_EXTENSION: &str = "png";

/// Extension of generated documentation pages.
pub const PAGE_EXTENSION: &str = "rst";

/// Page name of every index page; no example may use it.
pub const INDEX_PAGE: &str = "index";

/// Replacement for the data root in absolute-style cross-references.
pub const DOC_ROOT_MARKER: &str = "/..";

/// Render a path with `/` separators regardless of platform.
pub fn slash_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

/// Flattened figure base for an example: extension stripped, separators joined.
///
/// - `"a/ex1.py"` → `"a-ex1"`
/// - `"top.py"` → `"top"`
/// - `"a/b/deep.py"` → `"a-b-deep"`
pub fn figure_base(example_relative: &str) -> String {
    let without_ext = Path::new(example_relative).with_extension("");
    slash_path(&without_ext).replace('/', &FIGURE_JOIN.to_string())
}

/// Path of the rendered image for an example, always directly under `images_dir`.
pub fn image_path_for(example_relative: &str, images_dir: &Path) -> PathBuf {
    images_dir.join(format!(
        "{}.{}",
        figure_base(example_relative),
        IMAGE_EXTENSION
    ))
}

/// Path of the thumbnail for a rendered image: same file name, thumbnails dir.
pub fn thumbnail_path_for(image: &Path, thumbnails_dir: &Path) -> Option<PathBuf> {
    image.file_name().map(|name| thumbnails_dir.join(name))
}

/// Page name (no extension) of an example's content page: its file stem.
pub fn page_name(example_relative: &str) -> String {
    Path::new(example_relative)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| example_relative.to_string())
}

/// File name of an example's content page (`ex1.py` → `ex1.rst`).
pub fn page_file_name(example_relative: &str) -> String {
    format!("{}.{}", page_name(example_relative), PAGE_EXTENSION)
}

/// Rewrite `path` into a reference usable from a generated page.
///
/// With `relative == false` the data root prefix is replaced by
/// [`DOC_ROOT_MARKER`]. With `relative == true` the remainder is prefixed by
/// one `..` for every separator it contains, which lands back on the data
/// root from a page that sits as deep as the remainder. Paths outside the
/// data root are returned unchanged (slash-separated).
pub fn doc_reference_path_for(path: &Path, data_root: &Path, relative: bool) -> String {
    let full = slash_path(path);
    let root = slash_path(data_root);
    let remainder = match full.strip_prefix(root.as_str()) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.to_string(),
        _ => return full,
    };

    if relative {
        let depth = remainder.matches('/').count();
        let prefix = "../".repeat(depth);
        let prefix = prefix.strip_suffix('/').unwrap_or(&prefix);
        format!("{prefix}{remainder}")
    } else {
        format!("{DOC_ROOT_MARKER}{remainder}")
    }
}

/// Output file the solver wrote for the final state of `problem`.
///
/// Stationary problems write `<trunk>.<format>`; time-stepping problems
/// write one file per step, `<trunk>.<step>.<format>`, with the step
/// zero-padded to the problem's digit count.
pub fn result_file_for(problem: &Problem, trunk: &Path, format: &str) -> PathBuf {
    let trunk = trunk.to_string_lossy();
    match &problem.time_stepping {
        None => PathBuf::from(format!("{trunk}.{format}")),
        Some(ts) => PathBuf::from(format!("{trunk}.{}.{format}", ts.suffix())),
    }
}
