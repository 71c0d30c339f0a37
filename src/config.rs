//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. Stock defaults are
//! overridden by whatever the user file specifies; the file is optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [examples]
//! pattern = "*.py"                   # Glob matched against file names
//! omit = ["linear_elastic_mM.py"]    # Known-broken examples (base names)
//!
//! [solver]
//! program = "sfepy-run"
//! args = ["{example}", "-o", "{trunk}", "--format", "{format}"]
//! output_format = "vtk"
//!
//! [renderer]
//! program = "sfepy-view"
//! args = ["{source}", "-o", "{image}"]
//! scalar_bar_flag = "--scalar-bar"
//! offscreen_flag = "--off-screen"
//!
//! [thumbnails]
//! scale = 0.3
//!
//! [docs]
//! project = "sfepy"
//! title = "SfePy autogenerated gallery"
//! data_root = "."
//! maxdepth = 2
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [thumbnails]
//! scale = 0.25
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Which files under the examples root are examples.
    pub examples: ExamplesConfig,
    /// External solver invocation.
    pub solver: SolverConfig,
    /// External renderer invocation.
    pub renderer: RendererConfig,
    /// Thumbnail scaling.
    pub thumbnails: ThumbnailsConfig,
    /// Generated documentation pages.
    pub docs: DocsConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.examples.pattern.trim().is_empty() {
            return Err(ConfigError::Validation(
                "examples.pattern must not be empty".into(),
            ));
        }
        if let Err(e) = glob::Pattern::new(&self.examples.pattern) {
            return Err(ConfigError::Validation(format!(
                "examples.pattern is not a valid glob: {e}"
            )));
        }
        if self.solver.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "solver.program must not be empty".into(),
            ));
        }
        let format = &self.solver.output_format;
        if format.is_empty() || format.contains(['/', '\\', '.']) {
            return Err(ConfigError::Validation(
                "solver.output_format must be a bare extension like \"vtk\"".into(),
            ));
        }
        if self.renderer.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "renderer.program must not be empty".into(),
            ));
        }
        if !(self.thumbnails.scale > 0.0 && self.thumbnails.scale <= 1.0) {
            return Err(ConfigError::Validation(
                "thumbnails.scale must be in (0, 1]".into(),
            ));
        }
        if self.docs.maxdepth == 0 {
            return Err(ConfigError::Validation(
                "docs.maxdepth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Example discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExamplesConfig {
    /// Glob pattern matched against file names (not paths).
    pub pattern: String,
    /// Base names of examples known to fail; skipped by every stage.
    pub omit: Vec<String>,
}

impl Default for ExamplesConfig {
    fn default() -> Self {
        Self {
            pattern: "*.py".to_string(),
            omit: vec!["linear_elastic_mM.py".to_string()],
        }
    }
}

/// External solver command.
///
/// `args` may use the placeholders `{example}`, `{trunk}`, `{format}` and
/// `{output_dir}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Extension of the solver's result files.
    pub output_format: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            program: "sfepy-run".to_string(),
            args: ["{example}", "-o", "{trunk}", "--format", "{format}"]
                .map(String::from)
                .to_vec(),
            output_format: "vtk".to_string(),
        }
    }
}

/// External renderer command.
///
/// `args` may use the placeholders `{source}`, `{image}` and `{output_dir}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Appended when a scalar bar is requested.
    pub scalar_bar_flag: String,
    /// Appended when the result must not be shown interactively.
    pub offscreen_flag: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: "sfepy-view".to_string(),
            args: ["{source}", "-o", "{image}"].map(String::from).to_vec(),
            scalar_bar_flag: "--scalar-bar".to_string(),
            offscreen_flag: "--off-screen".to_string(),
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Linear scale factor applied to both image dimensions.
    pub scale: f64,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self { scale: 0.3 }
    }
}

/// Documentation page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Anchor prefix of the top-level index (`.. _<project>-index:`).
    pub project: String,
    /// Heading of the top-level index (`<title> examples`).
    pub title: String,
    /// Directory replaced by `/..` in cross-references.
    pub data_root: String,
    /// `:maxdepth:` of every generated toctree.
    pub maxdepth: u32,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            project: "sfepy".to_string(),
            title: "SfePy autogenerated gallery".to_string(),
            data_root: ".".to_string(),
            maxdepth: 2,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `path`, merged over stock defaults and validated.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Example Gallery Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Example discovery
# ---------------------------------------------------------------------------
[examples]
# Glob matched against file names under the examples directory (recursive).
pattern = "*.py"

# Base names of examples that are known to fail. They get no image, no
# thumbnail and no documentation page.
omit = ["linear_elastic_mM.py"]

# ---------------------------------------------------------------------------
# Solver
# ---------------------------------------------------------------------------
[solver]
# Command solving one example. Placeholders:
#   {example}     absolute path of the example script
#   {trunk}       output file trunk inside the scratch directory
#   {format}      output_format below
#   {output_dir}  the scratch directory
program = "sfepy-run"
args = ["{example}", "-o", "{trunk}", "--format", "{format}"]

# Extension of the files the solver writes (<trunk>.<format>, or
# <trunk>.<step>.<format> for time-dependent problems).
output_format = "vtk"

# ---------------------------------------------------------------------------
# Renderer
# ---------------------------------------------------------------------------
[renderer]
# Command rendering one result file to a PNG. Placeholders:
#   {source}      result file written by the solver
#   {image}       destination PNG
#   {output_dir}  the scratch directory
program = "sfepy-view"
args = ["{source}", "-o", "{image}"]

# Flags appended to request a scalar bar and offscreen rendering.
scalar_bar_flag = "--scalar-bar"
offscreen_flag = "--off-screen"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Scale factor applied to both dimensions of every gallery image (0 < scale <= 1).
scale = 0.3

# ---------------------------------------------------------------------------
# Documentation pages
# ---------------------------------------------------------------------------
[docs]
# Anchor prefix of the top-level index page.
project = "sfepy"

# Heading of the top-level index page ("<title> examples").
title = "SfePy autogenerated gallery"

# Directory replaced by "/.." in cross-references from the generated pages.
data_root = "."

# Depth of every generated toctree.
maxdepth = 2
"##
}
