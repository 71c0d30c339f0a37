//! Build driver.
//!
//! Resolves the gallery directories and runs the stages in order:
//!
//! ```text
//! 1. Images      examples/  →  images/*.png              (skipped by --no-images)
//! 2. Thumbnails  images/    →  images/thumbnails/*.png   (skipped by --no-images)
//! 3. Pages       examples/  →  <doc root>/examples/*.rst (always)
//! ```
//!
//! The page stage does not look at what the image stages produced; it
//! rediscovers the examples and references images by name, so it runs the
//! same way whether or not images were (re)built.

use crate::config::GalleryConfig;
use crate::generate::{self, DocsReport, GenerateError, PageSettings};
use crate::imaging::{ImageBackend, Scale};
use crate::output::{Reporter, Summary};
use crate::process::{self, ImageConfig, ImageReport, ProcessError};
use crate::render::Renderer;
use crate::scan::{ExampleFilter, ScanError};
use crate::solver::Solver;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Thumbnail subdirectory of the images directory.
pub const THUMBNAILS_DIR: &str = "thumbnails";
/// Page subdirectory of the documentation root.
pub const RST_DIR: &str = "examples";
/// Default images subdirectory of the documentation root.
pub const IMAGES_DIR: &str = "images";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("{0}")]
    Process(#[from] ProcessError),
    #[error("Page generation failed: {0}")]
    Generate(#[from] GenerateError),
}

/// Every directory the build reads or writes, all absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryDirs {
    pub examples_dir: PathBuf,
    pub doc_root: PathBuf,
    pub images_dir: PathBuf,
    pub thumbnails_dir: PathBuf,
    pub rst_dir: PathBuf,
}

impl GalleryDirs {
    /// Derive the layout from the CLI inputs.
    ///
    /// The documentation root is the directory containing `output`; only its
    /// parent matters, the file itself is never written. `examples_dir` must
    /// exist.
    pub fn resolve(
        examples_dir: &Path,
        images_dir: Option<&Path>,
        output: &Path,
    ) -> Result<Self, PipelineError> {
        let examples_dir = examples_dir
            .canonicalize()
            .map_err(|_| ScanError::MissingExamplesDir(examples_dir.to_path_buf()))?;

        let output = std::path::absolute(output)?;
        let doc_root = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output.clone());

        let images_dir = match images_dir {
            Some(dir) => std::path::absolute(dir)?,
            None => doc_root.join(IMAGES_DIR),
        };
        let thumbnails_dir = images_dir.join(THUMBNAILS_DIR);
        let rst_dir = doc_root.join(RST_DIR);

        Ok(Self {
            examples_dir,
            doc_root,
            images_dir,
            thumbnails_dir,
            rst_dir,
        })
    }
}

/// Canonical data root when it exists, absolute otherwise.
pub fn resolve_data_root(data_root: &Path) -> Result<PathBuf, PipelineError> {
    match data_root.canonicalize() {
        Ok(path) => Ok(path),
        Err(_) => Ok(std::path::absolute(data_root)?),
    }
}

/// The external collaborators one build talks to.
pub struct Toolchain<S, R, B> {
    pub solver: S,
    pub renderer: R,
    pub backend: B,
}

/// What one build produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildReport {
    /// `None` when image generation was skipped.
    pub images: Option<ImageReport>,
    pub thumbnails: Vec<PathBuf>,
    pub docs: DocsReport,
}

impl BuildReport {
    pub fn summary(&self) -> Summary {
        Summary {
            rendered: self.images.as_ref().map_or(0, |r| r.rendered.len()),
            failed: self.images.as_ref().map_or(0, |r| r.failed.len()),
            thumbnails: self.thumbnails.len(),
            pages: self.docs.pages.len(),
            images_skipped: self.images.is_none(),
        }
    }
}

/// Run the build: images and thumbnails unless `skip_images`, then pages.
pub fn run<S, R, B>(
    dirs: &GalleryDirs,
    config: &GalleryConfig,
    skip_images: bool,
    toolchain: &mut Toolchain<S, R, B>,
    reporter: &Reporter,
) -> Result<BuildReport, PipelineError>
where
    S: Solver,
    R: Renderer,
    B: ImageBackend,
{
    let filter = ExampleFilter::from_config(&config.examples)?;
    let mut report = BuildReport::default();

    if !skip_images {
        let images = process::generate_images(
            &toolchain.solver,
            &mut toolchain.renderer,
            &dirs.examples_dir,
            &dirs.images_dir,
            &filter,
            &ImageConfig {
                output_format: config.solver.output_format.clone(),
            },
            reporter,
        )?;
        report.images = Some(images);

        report.thumbnails = process::generate_thumbnails(
            &toolchain.backend,
            &dirs.thumbnails_dir,
            &dirs.images_dir,
            Scale::new(config.thumbnails.scale),
            reporter,
        )?;
    }

    let settings = PageSettings::from_config(
        &config.docs,
        resolve_data_root(Path::new(&config.docs.data_root))?,
    );
    report.docs = generate::generate(
        &dirs.rst_dir,
        &dirs.examples_dir,
        &dirs.images_dir,
        &filter,
        &settings,
        reporter,
    )?;

    Ok(report)
}
