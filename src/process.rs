//! Image and thumbnail generation.
//!
//! Stages 1 and 2 of the gallery build. Every example is solved, its final
//! result rendered to a PNG, and every PNG in the images directory is then
//! scaled down into `thumbnails/`.
//!
//! ## Output Structure
//!
//! ```text
//! images/
//! ├── a-ex1.png          # one flat file per example (see crate::naming)
//! ├── a-ex2.png
//! ├── b-ex3.png
//! └── thumbnails/
//!     ├── a-ex1.png      # same file name, scaled by thumbnails.scale
//!     ├── a-ex2.png
//!     └── b-ex3.png
//! ```
//!
//! ## Failure Isolation
//!
//! Examples are heterogeneous and some of them break. A failed solve or a
//! failed render is reported and the loop moves on; such an example simply
//! has no image. The only solver outcome that stops the stage is a user
//! interrupt ([`SolveOutcome::Cancelled`]), which becomes
//! [`ProcessError::Interrupted`].
//!
//! Thumbnailing has no such isolation: the first error aborts the stage.
//!
//! ## Scratch Output
//!
//! The solver writes into one temporary directory per run. Its contents are
//! removed after every example, whatever the outcome, so intermediate results
//! never pile up; the directory itself goes away when the stage returns.

use crate::imaging::{BackendError, ImageBackend, Scale, create_thumbnail};
use crate::naming::{self, IMAGE_EXTENSION};
use crate::output::{Event, Reporter, Stage};
use crate::render::{RenderError, RenderRequest, RenderSession, Renderer};
use crate::scan::{self, ExampleFilter, ScanError};
use crate::solver::{SolveOptions, SolveOutcome, Solver};
use crate::types::Example;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trunk of solver output file names inside the scratch directory.
const RESULT_TRUNK: &str = "result";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Renderer error: {0}")]
    Render(#[from] RenderError),
    #[error("Interrupted while solving {0}")]
    Interrupted(String),
}

/// Configuration for the image stage.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Extension of solver result files.
    pub output_format: String,
}

/// What the image stage produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImageReport {
    /// Images written, in example order.
    pub rendered: Vec<PathBuf>,
    /// Relative paths of examples without an image.
    pub failed: Vec<String>,
}

/// What happened to one example.
enum ExampleResult {
    Rendered(PathBuf),
    Failed(String),
    Interrupted,
}

/// Solve and render every example under `examples_dir` into `images_dir`.
pub fn generate_images(
    solver: &impl Solver,
    renderer: &mut impl Renderer,
    examples_dir: &Path,
    images_dir: &Path,
    filter: &ExampleFilter,
    config: &ImageConfig,
    reporter: &Reporter,
) -> Result<ImageReport, ProcessError> {
    reporter.emit(Event::StageStarted(Stage::Images));
    let examples = scan::discover(examples_dir, filter)?;

    fs::create_dir_all(images_dir)?;
    let scratch = tempfile::Builder::new()
        .prefix("example-gallery-")
        .tempdir()?;
    let options = SolveOptions::gallery(scratch.path().join(RESULT_TRUNK), &config.output_format);

    let mut session = RenderSession::open(renderer, scratch.path())?;
    let mut report = ImageReport::default();

    for example in &examples {
        reporter.emit(Event::ExampleStarted {
            relative: example.relative.clone(),
        });
        let nested = reporter.nested();

        let result = process_example(solver, &mut *session, example, images_dir, &options, &nested);

        session.clear();
        clear_dir(scratch.path())?;

        match result {
            ExampleResult::Rendered(image) => {
                nested.emit(Event::Done);
                report.rendered.push(image);
            }
            ExampleResult::Failed(reason) => {
                nested.emit(Event::ExampleFailed {
                    relative: example.relative.clone(),
                    reason,
                });
                report.failed.push(example.relative.clone());
            }
            ExampleResult::Interrupted => {
                return Err(ProcessError::Interrupted(example.relative.clone()));
            }
        }
    }

    reporter.emit(Event::Done);
    Ok(report)
}

fn process_example(
    solver: &impl Solver,
    renderer: &mut impl Renderer,
    example: &Example,
    images_dir: &Path,
    options: &SolveOptions,
    reporter: &Reporter,
) -> ExampleResult {
    let problem = match solver.solve(&example.path, options) {
        SolveOutcome::Solved(problem) => problem,
        SolveOutcome::Failed(reason) => return ExampleResult::Failed(reason),
        SolveOutcome::Cancelled => return ExampleResult::Interrupted,
    };

    let result_file = naming::result_file_for(
        &problem,
        &options.output_filename_trunk,
        &options.output_format,
    );
    let image = example.image_path(images_dir);
    reporter.emit(Event::Rendering {
        result_file: result_file.clone(),
        image: display_name(&image),
    });

    match renderer.render(&RenderRequest::gallery(result_file, image.clone())) {
        Ok(()) => ExampleResult::Rendered(image),
        Err(e) => ExampleResult::Failed(e.to_string()),
    }
}

/// Remove everything inside `dir`, keeping `dir`. A missing `dir` is fine.
pub fn clear_dir(dir: &Path) -> std::io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Scale every PNG directly inside `images_dir` into `thumbnails_dir`.
///
/// Returns the thumbnails written, sorted by file name.
pub fn generate_thumbnails(
    backend: &impl ImageBackend,
    thumbnails_dir: &Path,
    images_dir: &Path,
    scale: Scale,
    reporter: &Reporter,
) -> Result<Vec<PathBuf>, ProcessError> {
    reporter.emit(Event::StageStarted(Stage::Thumbnails));
    fs::create_dir_all(thumbnails_dir)?;
    reporter.message("generating thumbnails...");

    let nested = reporter.nested();
    let mut written = Vec::new();
    for image in list_images(images_dir)? {
        nested.emit(Event::ThumbnailWritten {
            image: display_name(&image),
        });
        let Some(thumbnail) = naming::thumbnail_path_for(&image, thumbnails_dir) else {
            continue;
        };
        create_thumbnail(backend, &image, &thumbnail, scale)?;
        written.push(thumbnail);
    }

    reporter.emit(Event::Done);
    Ok(written)
}

/// PNG files directly inside `dir` (not recursive), sorted.
fn list_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case(IMAGE_EXTENSION))
        })
        .collect();
    images.sort();
    Ok(images)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
