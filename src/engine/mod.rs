//! Build engine seam
//!
//! The pre-build step never evaluates targets files itself. It asks a
//! [`BuildEngine`] to load the definition as an isolated project, sets a couple
//! of properties on it and requests a target. Anything that can do those three
//! things can sit behind the trait; [`XmlTargetsEngine`] is the small built-in
//! implementation used by the CLI and the integration tests.

mod xml;

pub use xml::XmlTargetsEngine;

use crate::properties::PropertySet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to read {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{path:?} uses {construct}, which the built-in engine does not support")]
    Unsupported { path: PathBuf, construct: String },

    #[error("The target \"{0}\" does not exist in the project")]
    UnknownTarget(String),

    #[error("Circular dependency detected at target \"{0}\"")]
    CircularDependency(String),

    #[error("The project defines no targets to build")]
    NoTargets,
}

/// Importance attached to a message task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageImportance {
    High,
    Normal,
    Low,
}

/// Event raised by an engine while it builds a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent<'a> {
    TargetStarted { name: &'a str },
    TargetFinished { name: &'a str, succeeded: bool },
    Message { text: &'a str, importance: MessageImportance },
    Warning { text: &'a str },
    Error { text: &'a str },
    BuildFinished { succeeded: bool },
}

/// Receives engine output during a build.
pub trait BuildLogger {
    fn log(&mut self, event: &BuildEvent<'_>);
}

/// A definition loaded by an engine, independent of the solution's projects.
pub trait DefinitionProject {
    fn path(&self) -> &Path;

    fn set_property(&mut self, name: &str, value: &str);

    fn properties(&self) -> &PropertySet;

    /// Builds `target`, or the project's default targets when `None`.
    ///
    /// `Ok(false)` means the definition ran and reported an error; `Err` means
    /// the engine could not run the request at all.
    fn build(
        &mut self,
        target: Option<&str>,
        logger: &mut dyn BuildLogger,
    ) -> Result<bool, EngineError>;
}

pub trait BuildEngine {
    fn load(&self, path: &Path) -> Result<Box<dyn DefinitionProject>, EngineError>;
}

/// Logger that keeps owned copies of every event; handy for tests and reports.
#[derive(Debug, Default, Clone)]
pub struct RecordingLogger {
    pub lines: Vec<String>,
}

impl BuildLogger for RecordingLogger {
    fn log(&mut self, event: &BuildEvent<'_>) {
        let line = match event {
            BuildEvent::TargetStarted { name } => format!("start {}", name),
            BuildEvent::TargetFinished { name, succeeded } => {
                format!("finish {} {}", name, succeeded)
            }
            BuildEvent::Message { text, .. } => format!("message {}", text),
            BuildEvent::Warning { text } => format!("warning {}", text),
            BuildEvent::Error { text } => format!("error {}", text),
            BuildEvent::BuildFinished { succeeded } => format!("done {}", succeeded),
        };
        self.lines.push(line);
    }
}
