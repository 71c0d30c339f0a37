//! External renderer contract.
//!
//! Rendering a solver result into a PNG is delegated to a [`Renderer`]. One
//! renderer serves the whole image stage: it is opened once, bound to the
//! scratch directory the solver writes into, asked to render each example's
//! result file, cleared between examples, and closed at the end.
//!
//! [`RenderSession`] ties that lifecycle to a scope: opening a session opens
//! the renderer, dropping it closes the renderer, even when the image stage
//! bails out early with an error.

use crate::config::RendererConfig;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot run renderer {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Renderer failed: {0}")]
    Failed(String),
    #[error("Renderer is not open")]
    NotOpen,
}

/// One render: a result file in, a PNG out.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Display the scene interactively.
    pub show: bool,
    /// Annotate the image with a scalar bar.
    pub scalar_bar: bool,
}

impl RenderRequest {
    /// Gallery defaults: offscreen, with a scalar bar.
    pub fn gallery(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            show: false,
            scalar_bar: true,
        }
    }
}

/// Trait for renderer backends.
pub trait Renderer {
    /// Bind the renderer to the directory holding solver output.
    fn open(&mut self, output_dir: &Path) -> Result<(), RenderError>;

    /// Render `request.source` into `request.destination`.
    fn render(&mut self, request: &RenderRequest) -> Result<(), RenderError>;

    /// Drop per-example scene state before the next example.
    fn clear(&mut self);

    /// Release the renderer.
    fn close(&mut self);
}

/// Scoped renderer: opened on construction, closed on drop.
pub struct RenderSession<'a, R: Renderer> {
    renderer: &'a mut R,
}

impl<'a, R: Renderer> RenderSession<'a, R> {
    pub fn open(renderer: &'a mut R, output_dir: &Path) -> Result<Self, RenderError> {
        renderer.open(output_dir)?;
        Ok(Self { renderer })
    }
}

impl<R: Renderer> Deref for RenderSession<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: Renderer> DerefMut for RenderSession<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

impl<R: Renderer> Drop for RenderSession<'_, R> {
    fn drop(&mut self) {
        self.renderer.close();
    }
}

/// Renderer backend running an external viewer command per result file.
pub struct CommandRenderer {
    config: RendererConfig,
    /// Set between `open` and `close`.
    output_dir: Option<PathBuf>,
}

impl CommandRenderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            config: config.clone(),
            output_dir: None,
        }
    }

    /// Arguments for one render, placeholders substituted, flags appended.
    pub fn command_args(&self, request: &RenderRequest, output_dir: &Path) -> Vec<String> {
        let mut args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{source}", &request.source.to_string_lossy())
                    .replace("{image}", &request.destination.to_string_lossy())
                    .replace("{output_dir}", &output_dir.to_string_lossy())
            })
            .collect();
        if request.scalar_bar && !self.config.scalar_bar_flag.is_empty() {
            args.push(self.config.scalar_bar_flag.clone());
        }
        if !request.show && !self.config.offscreen_flag.is_empty() {
            args.push(self.config.offscreen_flag.clone());
        }
        args
    }
}

impl Renderer for CommandRenderer {
    fn open(&mut self, output_dir: &Path) -> Result<(), RenderError> {
        self.output_dir = Some(output_dir.to_path_buf());
        Ok(())
    }

    fn render(&mut self, request: &RenderRequest) -> Result<(), RenderError> {
        let output_dir = self.output_dir.clone().ok_or(RenderError::NotOpen)?;

        let output = Command::new(&self.config.program)
            .args(self.command_args(request, &output_dir))
            .current_dir(&output_dir)
            .output()
            .map_err(|source| RenderError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("");
            return Err(RenderError::Failed(format!(
                "{} exited with {}: {}",
                self.config.program,
                output.status,
                detail.trim()
            )));
        }
        if !request.destination.exists() {
            return Err(RenderError::Failed(format!(
                "{} did not write {}",
                self.config.program,
                request.destination.display()
            )));
        }
        Ok(())
    }

    /// Each render runs in its own process, so no scene survives it.
    fn clear(&mut self) {}

    fn close(&mut self) {
        self.output_dir = None;
    }
}
