//! End-to-end test of the public pipeline API.
//!
//! Stands in for the external solver and renderer with small in-process
//! implementations of the public traits and uses the real `RustBackend`, so
//! images and thumbnails are genuine PNG files.

use example_gallery::config::{GalleryConfig, SolverConfig};
use example_gallery::imaging::{Dimensions, ImageBackend, RustBackend};
use example_gallery::output::{Event, Reporter, format_report};
use example_gallery::pipeline::{self, GalleryDirs, Toolchain};
use example_gallery::render::{RenderError, RenderRequest, Renderer};
use example_gallery::solver::{CommandSolver, Problem, SolveOptions, SolveOutcome, Solver};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a stationary result file; fails for examples whose source says so.
struct ScriptSolver {
    solved: RefCell<Vec<String>>,
}

impl Solver for ScriptSolver {
    fn solve(&self, example: &Path, options: &SolveOptions) -> SolveOutcome {
        let source = fs::read_to_string(example).unwrap();
        self.solved
            .borrow_mut()
            .push(example.file_name().unwrap().to_string_lossy().into_owned());
        if source.contains("raise") {
            return SolveOutcome::Failed("ValueError".to_string());
        }
        let trunk = options.output_filename_trunk.to_string_lossy();
        fs::write(format!("{trunk}.{}", options.output_format), "mesh").unwrap();
        SolveOutcome::Solved(Problem {
            time_stepping: None,
        })
    }
}

/// Renders every result file to a 40x20 PNG.
#[derive(Default)]
struct PngRenderer {
    opened: Option<PathBuf>,
    closed: bool,
}

impl Renderer for PngRenderer {
    fn open(&mut self, output_dir: &Path) -> Result<(), RenderError> {
        self.opened = Some(output_dir.to_path_buf());
        Ok(())
    }

    fn render(&mut self, request: &RenderRequest) -> Result<(), RenderError> {
        assert!(request.source.exists(), "result file must exist");
        let img = image::RgbImage::from_pixel(40, 20, image::Rgb([200, 30, 30]));
        img.save_with_format(&request.destination, image::ImageFormat::Png)
            .map_err(|e| RenderError::Failed(e.to_string()))
    }

    fn clear(&mut self) {}

    fn close(&mut self) {
        self.closed = true;
    }
}

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, body) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
}

fn setup() -> (TempDir, GalleryDirs, GalleryConfig) {
    let tmp = TempDir::new().unwrap();
    write_tree(
        &tmp.path().join("examples"),
        &[
            ("a/ex1.py", "solve()\n"),
            ("a/ex2.py", "raise ValueError\n"),
            ("b/ex3.py", "solve()\n"),
            ("b/linear_elastic_mM.py", "solve()\n"),
            ("b/notes.txt", "not an example\n"),
        ],
    );
    let dirs = GalleryDirs::resolve(
        &tmp.path().join("examples"),
        None,
        &tmp.path().join("doc/gallery.html"),
    )
    .unwrap();
    let mut config = GalleryConfig::default();
    config.docs.data_root = tmp.path().to_string_lossy().into_owned();
    (tmp, dirs, config)
}

fn sorted_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn builds_gallery_with_isolated_failure() {
    let (_tmp, dirs, config) = setup();
    let mut toolchain = Toolchain {
        solver: ScriptSolver {
            solved: RefCell::new(Vec::new()),
        },
        renderer: PngRenderer::default(),
        backend: RustBackend::new(),
    };

    let report = pipeline::run(&dirs, &config, false, &mut toolchain, &Reporter::silent()).unwrap();

    assert_eq!(
        *toolchain.solver.solved.borrow(),
        vec!["ex1.py", "ex2.py", "ex3.py"]
    );
    assert!(toolchain.renderer.opened.is_some());
    assert!(toolchain.renderer.closed);

    assert_eq!(sorted_files(&dirs.images_dir), vec!["a-ex1.png", "b-ex3.png"]);
    assert_eq!(sorted_files(&dirs.thumbnails_dir), vec!["a-ex1.png", "b-ex3.png"]);
    let thumb = RustBackend::new()
        .identify(&dirs.thumbnails_dir.join("a-ex1.png"))
        .unwrap();
    assert_eq!(thumb, Dimensions { width: 12, height: 6 });

    assert_eq!(
        fs::read_to_string(dirs.rst_dir.join("index.rst")).unwrap(),
        "\
.. _sfepy-index:

SfePy autogenerated gallery examples
====================================

.. toctree::
    :maxdepth: 2

    a/index
    b/index
"
    );
    assert_eq!(
        fs::read_to_string(dirs.rst_dir.join("b/index.rst")).unwrap(),
        "\
.. _b-index:

b examples
==========

.. toctree::
    :maxdepth: 2

    ex3
"
    );
    assert_eq!(
        fs::read_to_string(dirs.rst_dir.join("a/ex2.rst")).unwrap(),
        "\
.. _a-ex2:

a/ex2.py
========

.. image:: /../doc/images/a-ex2.png

:download:`source code <../../../examples/a/ex2.py>`

.. literalinclude:: /../examples/a/ex2.py

"
    );
    assert!(!dirs.rst_dir.join("b/linear_elastic_mM.rst").exists());

    let summary = report.summary();
    assert_eq!((summary.rendered, summary.failed), (2, 1));
    assert_eq!((summary.thumbnails, summary.pages), (2, 3));
}

#[test]
fn rebuild_without_images_keeps_pages_identical() {
    let (_tmp, dirs, config) = setup();
    let mut toolchain = Toolchain {
        solver: ScriptSolver {
            solved: RefCell::new(Vec::new()),
        },
        renderer: PngRenderer::default(),
        backend: RustBackend::new(),
    };
    pipeline::run(&dirs, &config, false, &mut toolchain, &Reporter::silent()).unwrap();
    let before = fs::read_to_string(dirs.rst_dir.join("a/ex1.rst")).unwrap();

    let mut fresh = Toolchain {
        solver: ScriptSolver {
            solved: RefCell::new(Vec::new()),
        },
        renderer: PngRenderer::default(),
        backend: RustBackend::new(),
    };
    pipeline::run(&dirs, &config, true, &mut fresh, &Reporter::silent()).unwrap();

    assert!(fresh.solver.solved.borrow().is_empty());
    assert!(fresh.renderer.opened.is_none());
    assert_eq!(
        fs::read_to_string(dirs.rst_dir.join("a/ex1.rst")).unwrap(),
        before
    );
}

#[test]
fn progress_lines_follow_nesting() {
    let (_tmp, dirs, config) = setup();
    let mut toolchain = Toolchain {
        solver: ScriptSolver {
            solved: RefCell::new(Vec::new()),
        },
        renderer: PngRenderer::default(),
        backend: RustBackend::new(),
    };
    let (reporter, rx) = Reporter::channel();
    pipeline::run(&dirs, &config, false, &mut toolchain, &reporter).unwrap();
    drop(reporter);

    let reports: Vec<_> = rx.iter().collect();
    let lines: Vec<String> = reports.iter().flat_map(format_report).collect();

    assert_eq!(lines[0], "==> Images");
    assert_eq!(lines[1], "trying \"a/ex1.py\"...");
    assert!(lines[2].starts_with("    displaying results from \""));
    assert_eq!(lines[3], "    to \"a-ex1.png\"...");
    assert_eq!(lines[4], "    ...done");
    assert!(lines.iter().any(|l| l.starts_with("    ***** failed! *****")));
    assert!(lines.contains(&"generating thumbnails...".to_string()));
    assert!(lines.contains(&"generating rst files...".to_string()));
    assert!(lines.contains(&"    \"a/ex2.rst\"".to_string()));
    assert!(matches!(reports.last().map(|r| &r.event), Some(Event::Done)));
}

#[cfg(unix)]
#[test]
fn command_solver_failure_is_isolated() {
    let (_tmp, dirs, mut config) = setup();
    config.solver = SolverConfig {
        program: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            "grep -q raise {example} && exit 1; echo mesh > {trunk}.{format}".to_string(),
        ],
        output_format: "vtk".to_string(),
    };
    let mut toolchain = Toolchain {
        solver: CommandSolver::new(&config.solver),
        renderer: PngRenderer::default(),
        backend: RustBackend::new(),
    };

    let report = pipeline::run(&dirs, &config, false, &mut toolchain, &Reporter::silent()).unwrap();

    let images = report.images.unwrap();
    assert_eq!(images.failed, vec!["a/ex2.py"]);
    assert_eq!(sorted_files(&dirs.images_dir), vec!["a-ex1.png", "b-ex3.png"]);
}
