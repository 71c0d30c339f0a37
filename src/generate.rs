//! reStructuredText page generation.
//!
//! Stage 3 of the gallery build. Rediscovers the examples (with the same
//! filter as the image stage, so pages and images agree on the example set)
//! and writes a Sphinx source tree mirroring the examples directory.
//!
//! ## Generated Pages
//!
//! - **Top-level index** (`index.rst`): toctree of every group index, then
//!   any examples sitting directly in the examples root
//! - **Group index** (`<group>/index.rst`): toctree of the group's pages,
//!   in discovery order
//! - **Content page** (`<group>/<stem>.rst`): anchor, title, image, source
//!   download link and the inlined source
//!
//! ## Output Structure
//!
//! ```text
//! examples/                     # rst_dir
//! ├── index.rst                 # .. _sfepy-index:
//! ├── a/
//! │   ├── index.rst             # .. _a-index:
//! │   ├── ex1.rst               # .. _a-ex1:
//! │   └── ex2.rst
//! └── b/
//!     ├── index.rst
//!     └── ex3.rst
//! ```
//!
//! Every page is rewritten from scratch on every run; output depends only on
//! the examples tree and the configuration. Images are referenced whether or
//! not they exist, so pages can be built before (or without) the image stage.
//!
//! Any IO error aborts the stage.

use crate::config::DocsConfig;
use crate::naming::{self, INDEX_PAGE, PAGE_EXTENSION};
use crate::output::{Event, Reporter, Stage};
use crate::scan::{self, ExampleFilter, ScanError};
use crate::types::Example;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Where pages go and how cross-references are written.
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub project: String,
    pub title: String,
    pub maxdepth: u32,
    /// Directory replaced by `/..` in cross-references (absolute path).
    pub data_root: PathBuf,
}

impl PageSettings {
    pub fn from_config(docs: &DocsConfig, data_root: PathBuf) -> Self {
        Self {
            project: docs.project.clone(),
            title: docs.title.clone(),
            maxdepth: docs.maxdepth,
            data_root,
        }
    }
}

/// Pages written by one run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DocsReport {
    pub indexes: Vec<PathBuf>,
    pub pages: Vec<PathBuf>,
}

/// Write the full page tree for `examples_dir` into `rst_dir`.
pub fn generate(
    rst_dir: &Path,
    examples_dir: &Path,
    images_dir: &Path,
    filter: &ExampleFilter,
    settings: &PageSettings,
    reporter: &Reporter,
) -> Result<DocsReport, GenerateError> {
    reporter.emit(Event::StageStarted(Stage::Pages));
    let examples = scan::discover(examples_dir, filter)?;

    fs::create_dir_all(rst_dir)?;
    reporter.message("generating rst files...");
    let nested = reporter.nested();

    let mut report = DocsReport::default();
    let mut top_entries = Vec::new();
    let mut top_pages = Vec::new();

    for (group, members) in scan::group_by_directory(&examples) {
        let group_dir = if group.is_empty() {
            rst_dir.to_path_buf()
        } else {
            rst_dir.join(&group)
        };
        fs::create_dir_all(&group_dir)?;

        let mut entries = Vec::with_capacity(members.len());
        for example in members {
            let file_name = naming::page_file_name(&example.relative);
            let page_path = group_dir.join(&file_name);
            nested.emit(Event::PageWritten {
                page: page_display_name(&group, &file_name),
            });
            fs::write(
                &page_path,
                content_page(example, images_dir, &settings.data_root),
            )?;
            entries.push(naming::page_name(&example.relative));
            report.pages.push(page_path);
        }

        if group.is_empty() {
            top_pages = entries;
        } else {
            let index = group_dir.join(index_file_name());
            fs::write(
                &index,
                index_page(&group, &group, settings.maxdepth, &entries),
            )?;
            report.indexes.push(index);
            top_entries.push(format!("{group}/{INDEX_PAGE}"));
        }
    }

    top_entries.extend(top_pages);
    let index = rst_dir.join(index_file_name());
    fs::write(
        &index,
        index_page(
            &settings.project,
            &settings.title,
            settings.maxdepth,
            &top_entries,
        ),
    )?;
    report.indexes.insert(0, index);

    reporter.emit(Event::Done);
    Ok(report)
}

fn index_file_name() -> String {
    format!("{INDEX_PAGE}.{PAGE_EXTENSION}")
}

fn page_display_name(group: &str, file_name: &str) -> String {
    if group.is_empty() {
        file_name.to_string()
    } else {
        format!("{group}/{file_name}")
    }
}

/// `=` underline as long as `text`, in characters.
fn underline(text: &str) -> String {
    "=".repeat(text.chars().count())
}

/// Index page: anchor, `<heading> examples` title, toctree of `entries`.
pub fn index_page(anchor: &str, heading: &str, maxdepth: u32, entries: &[String]) -> String {
    let title = format!("{heading} examples");
    let mut page = format!(
        ".. _{anchor}-index:\n\n{title}\n{}\n\n.. toctree::\n    :maxdepth: {maxdepth}\n\n",
        underline(&title)
    );
    for entry in entries {
        page.push_str("    ");
        page.push_str(entry);
        page.push('\n');
    }
    page
}

/// Content page for one example.
pub fn content_page(example: &Example, images_dir: &Path, data_root: &Path) -> String {
    let image = naming::doc_reference_path_for(&example.image_path(images_dir), data_root, false);
    let download = naming::doc_reference_path_for(&example.path, data_root, true);
    let include = naming::doc_reference_path_for(&example.path, data_root, false);
    format!(
        ".. _{anchor}:\n\n{title}\n{rule}\n\n.. image:: {image}\n\n:download:`source code <{download}>`\n\n.. literalinclude:: {include}\n\n",
        anchor = example.figure_base(),
        title = example.relative,
        rule = underline(&example.relative),
    )
}
