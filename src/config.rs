//! Configuration management for solution-targets
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `SOLUTION_TARGETS_VERBOSITY`: Build output verbosity
//!   (quiet|minimal|normal|detailed|diagnostic or 0..4) - default: "minimal"
//! - `SOLUTION_TARGETS_NONE_TARGET`: What to do when no build action was seen
//!   (default|skip|error) - default: "default"
//! - `SOLUTION_TARGETS_LOG_LEVEL`: Logging level - default: "info"
//! - `SOLUTION_TARGETS_SETTINGS_FILE`: TOML settings file holding the build
//!   output verbosity - default: `<config dir>/solution-targets/settings.toml`
//!   when that file exists
//!
//! # Example
//!
//! ```no_run
//! use solution_targets::SolutionTargetsConfig;
//!
//! let config = SolutionTargetsConfig::default();
//! config.validate().expect("Invalid configuration");
//! let settings = config.settings_store();
//! ```

use crate::host::{default_settings_path, EnvSettings, FileSettings, SettingsStore};
use crate::prebuild::NoneTargetPolicy;
use crate::verbosity::Verbosity;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const VERBOSITY_VAR: &str = crate::host::VERBOSITY_ENV_VAR;
pub const NONE_TARGET_VAR: &str = "SOLUTION_TARGETS_NONE_TARGET";
pub const LOG_LEVEL_VAR: &str = "SOLUTION_TARGETS_LOG_LEVEL";
pub const SETTINGS_FILE_VAR: &str = "SOLUTION_TARGETS_SETTINGS_FILE";

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionTargetsConfig {
    /// Verbosity used until the settings store says otherwise
    pub verbosity: Verbosity,

    pub none_target: NoneTargetPolicy,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub settings_file: Option<PathBuf>,
}

impl Default for SolutionTargetsConfig {
    /// Loads from the environment. Unparseable values fall back to defaults;
    /// use [`SolutionTargetsConfig::from_env`] to have them reported instead.
    fn default() -> Self {
        let verbosity = env::var(VERBOSITY_VAR)
            .ok()
            .and_then(|v| v.parse::<Verbosity>().ok())
            .unwrap_or_default();

        let none_target = env::var(NONE_TARGET_VAR)
            .ok()
            .and_then(|v| v.parse::<NoneTargetPolicy>().ok())
            .unwrap_or_default();

        let log_level = env::var(LOG_LEVEL_VAR)
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let settings_file = env::var(SETTINGS_FILE_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            verbosity,
            none_target,
            log_level,
            settings_file,
        }
    }
}

impl SolutionTargetsConfig {
    /// Strict variant of `default()`: any set but unparseable variable is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var(VERBOSITY_VAR) {
            config.verbosity = value.parse().map_err(|e: crate::verbosity::VerbosityError| {
                ConfigError::ParseError {
                    field: VERBOSITY_VAR.to_string(),
                    error: e.to_string(),
                }
            })?;
        }

        if let Ok(value) = env::var(NONE_TARGET_VAR) {
            config.none_target = value.parse().map_err(|error| ConfigError::ParseError {
                field: NONE_TARGET_VAR.to_string(),
                error,
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the log level is valid and that an explicit settings file
    /// path is not a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if let Some(ref path) = self.settings_file {
            if path.is_dir() {
                return Err(ConfigError::ValidationFailed(format!(
                    "Settings file {} is a directory",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// The settings store the coordinator should read verbosity from.
    ///
    /// An explicit settings file wins, then the per-user settings file if it
    /// exists, then the verbosity environment variable.
    pub fn settings_store(&self) -> Box<dyn SettingsStore> {
        if let Some(ref path) = self.settings_file {
            return Box::new(FileSettings::new(path, self.verbosity));
        }

        match default_settings_path() {
            Some(path) if path.is_file() => Box::new(FileSettings::new(path, self.verbosity)),
            _ => Box::new(EnvSettings::new(self.verbosity)),
        }
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("verbosity".to_string(), self.verbosity.to_string());
        map.insert("none_target".to_string(), self.none_target.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());
        if let Some(ref path) = self.settings_file {
            map.insert("settings_file".to_string(), path.display().to_string());
        }

        map
    }
}

impl fmt::Display for SolutionTargetsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution Targets Configuration:")?;
        writeln!(f, "  Verbosity: {}", self.verbosity)?;
        writeln!(f, "  None Target: {}", self.none_target)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        if let Some(ref path) = self.settings_file {
            writeln!(f, "  Settings File: {}", path.display())?;
        }
        Ok(())
    }
}
