//! Interfaces to the hosting environment
//!
//! The pre-build step runs inside a host that owns the solution, the build
//! output pane and the settings store. These traits are the only way the core
//! talks to it.

mod pane;
mod settings;

pub use pane::{MemoryPane, OutputPane, StderrPane};
pub use settings::{
    default_settings_path, read_verbosity, EnvSettings, FileSettings, FixedSettings,
    SettingsError, SettingsStore, VERBOSITY_ENV_VAR,
};

#[cfg(test)]
pub use settings::MockSettingsStore;

use serde::Serialize;
use std::path::PathBuf;

/// Status reported back for a build lifecycle callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    Ok,
    /// Host state was inconsistent; the host stops the update.
    Unexpected,
}

impl HostStatus {
    pub fn is_success(self) -> bool {
        self == HostStatus::Ok
    }
}

/// Answer to the begin/start-update callbacks, which may also ask the host to
/// cancel the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResponse {
    pub status: HostStatus,
    pub cancel_update: bool,
}

impl UpdateResponse {
    pub fn proceed(status: HostStatus) -> Self {
        Self {
            status,
            cancel_update: false,
        }
    }
}

/// The open solution as seen by the host.
#[cfg_attr(test, mockall::automock)]
pub trait SolutionHost {
    /// Full path of the solution file, if a solution is open.
    fn solution_path(&self) -> Option<PathBuf>;

    /// Name of the active solution configuration (e.g. `Debug`).
    fn active_configuration(&self) -> Option<String>;
}

/// Fixed solution description, used by the CLI and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSolution {
    pub path: PathBuf,
    pub configuration: String,
}

impl StaticSolution {
    pub fn new(path: impl Into<PathBuf>, configuration: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            configuration: configuration.into(),
        }
    }
}

impl SolutionHost for StaticSolution {
    fn solution_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn active_configuration(&self) -> Option<String> {
        Some(self.configuration.clone())
    }
}
