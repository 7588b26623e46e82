//! Verbosity-gated diagnostic output
//!
//! [`DiagnosticLog`] writes the core's own lines to the host's build output
//! pane, prefixed with the component tag. [`PaneBuildLogger`] forwards engine
//! output from a definition build to the same pane, console-logger style.
//! Every line is also emitted as a `tracing` event so it shows up in logs even
//! when the pane is filtered or absent.

use crate::engine::{BuildEvent, BuildLogger, MessageImportance};
use crate::host::OutputPane;
use crate::verbosity::Verbosity;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub const COMPONENT_TAG: &str = "CommonSolutionTargets";

pub struct DiagnosticLog {
    pane: Option<Box<dyn OutputPane>>,
    verbosity: Verbosity,
}

impl DiagnosticLog {
    pub fn new(pane: Option<Box<dyn OutputPane>>, verbosity: Verbosity) -> Self {
        Self { pane, verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    pub fn has_pane(&self) -> bool {
        self.pane.is_some()
    }

    /// Writes a tagged line when the configured verbosity is at least `level`.
    pub fn write_line(&self, level: Verbosity, message: &str) {
        debug!(pane_level = %level, "{}", message);
        self.emit(level, &format!("{}: {}\n", COMPONENT_TAG, message));
    }

    /// Writes an untagged line (engine output).
    pub fn write_raw(&self, level: Verbosity, line: &str) {
        trace!(pane_level = %level, "{}", line);
        self.emit(level, &format!("{}\n", line));
    }

    fn emit(&self, level: Verbosity, text: &str) {
        let Some(pane) = &self.pane else {
            return;
        };
        if !self.verbosity.allows(level) {
            return;
        }
        pane.output_string(text);
    }
}

/// Routes engine events into a [`DiagnosticLog`] at a fixed verbosity.
pub struct PaneBuildLogger<'a> {
    log: &'a DiagnosticLog,
    verbosity: Verbosity,
    project: PathBuf,
}

impl<'a> PaneBuildLogger<'a> {
    pub fn new(log: &'a DiagnosticLog, verbosity: Verbosity, project: &Path) -> Self {
        Self {
            log,
            verbosity,
            project: project.to_path_buf(),
        }
    }

    fn write(&self, level: Verbosity, line: &str) {
        if self.verbosity.allows(level) {
            self.log.write_raw(level, line);
        }
    }
}

impl BuildLogger for PaneBuildLogger<'_> {
    fn log(&mut self, event: &BuildEvent<'_>) {
        match event {
            BuildEvent::TargetStarted { name } => {
                self.write(Verbosity::Normal, &format!("{}:", name));
            }
            BuildEvent::TargetFinished { name, succeeded } => {
                let suffix = if *succeeded { "" } else { " -- FAILED" };
                self.write(
                    Verbosity::Detailed,
                    &format!("Done building target \"{}\".{}", name, suffix),
                );
            }
            BuildEvent::Message { text, importance } => {
                let level = match importance {
                    MessageImportance::High => Verbosity::Minimal,
                    MessageImportance::Normal => Verbosity::Normal,
                    MessageImportance::Low => Verbosity::Detailed,
                };
                self.write(level, &format!("  {}", text));
            }
            BuildEvent::Warning { text } => {
                self.write(
                    Verbosity::Minimal,
                    &format!("{} : warning : {}", self.project.display(), text),
                );
            }
            BuildEvent::Error { text } => {
                self.write(
                    Verbosity::Quiet,
                    &format!("{} : error : {}", self.project.display(), text),
                );
            }
            BuildEvent::BuildFinished { succeeded } => {
                let line = if *succeeded {
                    "Build succeeded."
                } else {
                    "Build FAILED."
                };
                self.write(Verbosity::Normal, line);
            }
        }
    }
}
