//! CLI output formatting for all pipeline stages.
//!
//! # Reporting
//!
//! Stages never print. They emit typed [`Event`]s through a [`Reporter`]
//! handle passed in by the caller. A reporter carries an indentation depth:
//! [`Reporter::nested`] hands out a child one level deeper for the duration
//! of a nested operation, and the parent level is back in effect once the
//! child goes out of scope. There is no shared mutable prefix anywhere.
//!
//! # Output Format
//!
//! ```text
//! ==> Images
//! trying "a/ex1.py"...
//!     displaying results from "/tmp/.tmpX/result.vtk"
//!     to "a-ex1.png"...
//!     ...done
//! trying "a/ex2.py"...
//!     ***** failed! ***** (exit status: 1: ValueError)
//! ==> Thumbnails
//! generating thumbnails...
//!     "a-ex1.png"
//! ...done
//! ==> Pages
//! generating rst files...
//!     "a/ex1.rst"
//! ...done
//! Rendered 1 images (1 failed), 1 thumbnails, 3 pages
//! ```
//!
//! # Architecture
//!
//! [`format_report`] and [`format_summary`] are pure (return `Vec<String>` /
//! `String`) for testability; `main` drains the reporter's channel on a
//! printer thread and writes the lines to stdout.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Pipeline stage, used for section headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Images,
    Thumbnails,
    Pages,
}

impl Stage {
    fn title(self) -> &'static str {
        match self {
            Stage::Images => "Images",
            Stage::Thumbnails => "Thumbnails",
            Stage::Pages => "Pages",
        }
    }
}

/// Something worth telling the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StageStarted(Stage),
    /// Free-form progress message (`generating thumbnails...`).
    Message(String),
    ExampleStarted {
        relative: String,
    },
    ExampleFailed {
        relative: String,
        reason: String,
    },
    Rendering {
        result_file: PathBuf,
        image: String,
    },
    ThumbnailWritten {
        image: String,
    },
    PageWritten {
        page: String,
    },
    Done,
}

/// An event together with the nesting depth it was emitted at.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub depth: usize,
    pub event: Event,
}

/// Handle stages use to report progress.
///
/// Cloning is cheap; a reporter without a channel discards everything.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    tx: Option<Sender<Report>>,
    depth: usize,
}

impl Reporter {
    pub fn new(tx: Sender<Report>) -> Self {
        Self {
            tx: Some(tx),
            depth: 0,
        }
    }

    /// A reporter that drops every event.
    pub fn silent() -> Self {
        Self::default()
    }

    /// A reporter plus the receiving end of its channel.
    pub fn channel() -> (Self, Receiver<Report>) {
        let (tx, rx) = channel();
        (Self::new(tx), rx)
    }

    /// Child reporter one indentation level deeper.
    pub fn nested(&self) -> Reporter {
        Reporter {
            tx: self.tx.clone(),
            depth: self.depth + 1,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn emit(&self, event: Event) {
        if let Some(tx) = &self.tx {
            // A closed receiver only means nobody is listening.
            let _ = tx.send(Report {
                depth: self.depth,
                event,
            });
        }
    }

    pub fn message(&self, text: impl Into<String>) {
        self.emit(Event::Message(text.into()));
    }
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format one report as display lines.
pub fn format_report(report: &Report) -> Vec<String> {
    let pad = indent(report.depth);
    let lines = match &report.event {
        Event::StageStarted(stage) => vec![format!("==> {}", stage.title())],
        Event::Message(text) => vec![text.clone()],
        Event::ExampleStarted { relative } => vec![format!("trying \"{relative}\"...")],
        Event::ExampleFailed { reason, .. } => {
            vec![format!("***** failed! ***** ({reason})")]
        }
        Event::Rendering { result_file, image } => vec![
            format!("displaying results from \"{}\"", result_file.display()),
            format!("to \"{image}\"..."),
        ],
        Event::ThumbnailWritten { image } => vec![format!("\"{image}\"")],
        Event::PageWritten { page } => vec![format!("\"{page}\"")],
        Event::Done => vec!["...done".to_string()],
    };
    lines.into_iter().map(|l| format!("{pad}{l}")).collect()
}

/// Counts shown after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub rendered: usize,
    pub failed: usize,
    pub thumbnails: usize,
    pub pages: usize,
    pub images_skipped: bool,
}

/// Format the closing summary line.
pub fn format_summary(summary: &Summary) -> String {
    if summary.images_skipped {
        format!("Images skipped, {} pages", summary.pages)
    } else {
        format!(
            "Rendered {} images ({} failed), {} thumbnails, {} pages",
            summary.rendered, summary.failed, summary.thumbnails, summary.pages
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
