//! # Example Gallery
//!
//! Builds a documentation gallery from a directory of example scripts. Each
//! example is run through an external solver, its result rendered to a PNG
//! and thumbnailed, and a Sphinx (reStructuredText) source tree is written
//! that mirrors the examples directory.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Images      examples/  →  images/             (solve + render, per example)
//! 2. Thumbnails  images/    →  images/thumbnails/  (scale every PNG)
//! 3. Pages       examples/  →  examples/*.rst      (index + content pages)
//! ```
//!
//! Stages 1 and 2 are optional (`--no-images`). Stage 3 always runs and does
//! not read what the earlier stages produced: all three derive file names
//! from the example's relative path through [`naming`], so a page refers to
//! the right image whether or not that image exists yet.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Path rules: flat image names, page names, doc cross-references, result files |
//! | [`types`] | The [`types::Example`] join key |
//! | [`scan`] | Example discovery, exclusion list, directory groups |
//! | [`solver`] | External solver contract and the command-line solver |
//! | [`render`] | External renderer contract, scoped render session, command-line renderer |
//! | [`imaging`] | Pure-Rust thumbnailing on the `image` crate |
//! | [`process`] | Stages 1 and 2: images and thumbnails |
//! | [`generate`] | Stage 3: reStructuredText pages |
//! | [`pipeline`] | Directory resolution and stage sequencing |
//! | [`config`] | `gallery.toml` loading, merging and validation |
//! | [`output`] | Progress events, nested reporter, line formatting |
//!
//! # Design Decisions
//!
//! ## Failure Isolation
//!
//! Example scripts are heterogeneous and some of them fail. A solve reports
//! [`solver::SolveOutcome`] instead of an error: a failed example is logged
//! and skipped, only a user interrupt stops the build. Everything after the
//! solve/render step (thumbnails, pages) is deterministic and aborts on the
//! first error.
//!
//! ## External Tools Behind Traits
//!
//! The solver and renderer are external programs, configured in
//! `gallery.toml`. Stages only see the [`solver::Solver`],
//! [`render::Renderer`] and [`imaging::ImageBackend`] traits, so tests drive
//! the whole pipeline with recording mocks.
//!
//! ## No Global Output State
//!
//! Progress is reported through an explicit [`output::Reporter`] passed to
//! every stage. Nested operations get a nested reporter; there is no shared
//! indentation prefix to save and restore.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod scan;
pub mod solver;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
