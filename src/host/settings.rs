//! Host settings
//!
//! The only setting the pre-build step reads is the build output verbosity
//! (`MSBuildOutputVerbosity`, 0=quiet .. 4=diagnostic). It is read at the start
//! of every build cycle, so stores must not cache it.

use crate::verbosity::{Verbosity, VerbosityError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const VERBOSITY_ENV_VAR: &str = "SOLUTION_TARGETS_VERBOSITY";

const SETTINGS_DIR: &str = "solution-targets";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read settings file {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error(transparent)]
    Verbosity(#[from] VerbosityError),
}

#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore {
    /// Raw `MSBuildOutputVerbosity` value.
    fn msbuild_output_verbosity(&self) -> Result<i64, SettingsError>;
}

/// Reads the store and converts the raw value.
pub fn read_verbosity(store: &dyn SettingsStore) -> Result<Verbosity, SettingsError> {
    let raw = store.msbuild_output_verbosity()?;
    Ok(Verbosity::try_from(raw)?)
}

/// `<config dir>/solution-targets/settings.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSettings(pub Verbosity);

impl SettingsStore for FixedSettings {
    fn msbuild_output_verbosity(&self) -> Result<i64, SettingsError> {
        Ok(self.0 as i64)
    }
}

/// Reads the verbosity from an environment variable on every call, falling
/// back to `default` when it is unset.
#[derive(Debug, Clone)]
pub struct EnvSettings {
    var: String,
    default: Verbosity,
}

impl EnvSettings {
    pub fn new(default: Verbosity) -> Self {
        Self::with_var(VERBOSITY_ENV_VAR, default)
    }

    pub fn with_var(var: impl Into<String>, default: Verbosity) -> Self {
        Self {
            var: var.into(),
            default,
        }
    }
}

impl SettingsStore for EnvSettings {
    fn msbuild_output_verbosity(&self) -> Result<i64, SettingsError> {
        match env::var(&self.var) {
            Ok(value) => parse_raw(&self.var, &value),
            Err(env::VarError::NotPresent) => Ok(self.default as i64),
            Err(e) => Err(SettingsError::ParseError {
                field: self.var.clone(),
                error: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    projects_and_solution: ProjectsAndSolution,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectsAndSolution {
    msbuild_output_verbosity: Option<toml::Value>,
}

/// TOML settings file, re-read on every call:
///
/// ```toml
/// [projects_and_solution]
/// msbuild_output_verbosity = 3    # or "detailed"
/// ```
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    default: Verbosity,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>, default: Verbosity) -> Self {
        Self {
            path: path.into(),
            default,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettings {
    fn msbuild_output_verbosity(&self) -> Result<i64, SettingsError> {
        if !self.path.exists() {
            return Err(SettingsError::Unavailable(format!(
                "{} does not exist",
                self.path.display()
            )));
        }

        let content = fs::read_to_string(&self.path).map_err(|e| SettingsError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let parsed: SettingsFile =
            toml::from_str(&content).map_err(|e| SettingsError::ParseError {
                field: self.path.display().to_string(),
                error: e.to_string(),
            })?;

        match parsed.projects_and_solution.msbuild_output_verbosity {
            None => Ok(self.default as i64),
            Some(toml::Value::Integer(n)) => Ok(n),
            Some(toml::Value::String(s)) => parse_raw("msbuild_output_verbosity", &s),
            Some(other) => Err(SettingsError::ParseError {
                field: "msbuild_output_verbosity".to_string(),
                error: format!("expected integer or string, found {}", other.type_str()),
            }),
        }
    }
}

fn parse_raw(field: &str, value: &str) -> Result<i64, SettingsError> {
    if let Ok(n) = value.trim().parse::<i64>() {
        return Ok(n);
    }
    value
        .parse::<Verbosity>()
        .map(|v| v as i64)
        .map_err(|e| SettingsError::ParseError {
            field: field.to_string(),
            error: e.to_string(),
        })
}
