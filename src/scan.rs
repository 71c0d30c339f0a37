//! Example discovery and directory grouping.
//!
//! Every stage that needs the example list gets it from [`discover`], so the
//! image stage and the page stage can never disagree about which examples
//! exist. Discovery walks the examples root recursively (sorted by file name,
//! so the order is the same on every run), keeps files whose name matches the
//! configured glob pattern, and drops files whose name is on the exclusion
//! list.
//!
//! ## Validation
//!
//! Images live in one flat directory, so two examples whose flattened names
//! coincide (`a/b-c.py` and `a-b/c.py`) would overwrite each other's image.
//! [`discover`] rejects such a corpus with [`ScanError::FigureCollision`].
//!
//! Index pages share the directory of the content pages, so an example whose
//! page name is [`INDEX_PAGE`] would be overwritten by its group index.
//! [`discover`] rejects it with [`ScanError::ReservedPageName`].

use crate::config::ExamplesConfig;
use crate::naming::{self, INDEX_PAGE};
use crate::types::Example;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid example pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Examples directory not found: {0}")]
    MissingExamplesDir(PathBuf),
    #[error("Examples {first} and {second} both flatten to figure {figure}")]
    FigureCollision {
        first: String,
        second: String,
        figure: String,
    },
    #[error("Example {0} would be overwritten by the index page; rename it")]
    ReservedPageName(String),
}

/// Which files count as examples.
#[derive(Debug, Clone)]
pub struct ExampleFilter {
    pattern: glob::Pattern,
    omit: Vec<String>,
}

impl ExampleFilter {
    pub fn new(pattern: &str, omit: &[String]) -> Result<Self, ScanError> {
        Ok(Self {
            pattern: glob::Pattern::new(pattern)?,
            omit: omit.to_vec(),
        })
    }

    pub fn from_config(config: &ExamplesConfig) -> Result<Self, ScanError> {
        Self::new(&config.pattern, &config.omit)
    }

    /// True if a file with this base name is a (non-excluded) example.
    pub fn accepts(&self, file_name: &str) -> bool {
        self.pattern.matches(file_name) && !self.omit.iter().any(|o| o == file_name)
    }
}

/// Find every example under `examples_dir`, in walk order.
pub fn discover(examples_dir: &Path, filter: &ExampleFilter) -> Result<Vec<Example>, ScanError> {
    if !examples_dir.is_dir() {
        return Err(ScanError::MissingExamplesDir(examples_dir.to_path_buf()));
    }

    let mut examples = Vec::new();
    for entry in WalkDir::new(examples_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if !filter.accepts(&file_name) {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(examples_dir)
            .map(naming::slash_path)
            .unwrap_or_else(|_| naming::slash_path(path));
        examples.push(Example::new(path.to_path_buf(), relative));
    }

    check_reserved_page_names(&examples)?;
    check_figure_collisions(&examples)?;
    Ok(examples)
}

/// Reject examples whose page would collide with an index page.
pub fn check_reserved_page_names(examples: &[Example]) -> Result<(), ScanError> {
    match examples
        .iter()
        .find(|e| naming::page_name(&e.relative) == INDEX_PAGE)
    {
        Some(example) => Err(ScanError::ReservedPageName(example.relative.clone())),
        None => Ok(()),
    }
}

/// Reject corpora in which two examples flatten to the same figure name.
pub fn check_figure_collisions(examples: &[Example]) -> Result<(), ScanError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for example in examples {
        let figure = example.figure_base();
        if let Some(first) = seen.insert(figure.clone(), &example.relative) {
            return Err(ScanError::FigureCollision {
                first: first.to_string(),
                second: example.relative.clone(),
                figure,
            });
        }
    }
    Ok(())
}

/// Group examples by relative parent directory.
///
/// Keys are sorted; members keep discovery order. Top-level examples are
/// grouped under `""`.
pub fn group_by_directory(examples: &[Example]) -> BTreeMap<String, Vec<&Example>> {
    let mut groups: BTreeMap<String, Vec<&Example>> = BTreeMap::new();
    for example in examples {
        groups
            .entry(example.group().to_string())
            .or_default()
            .push(example);
    }
    groups
}
