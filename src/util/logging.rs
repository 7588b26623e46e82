//! Structured logging setup for solution-targets
//!
//! `tracing` carries the crate's own operational logs (what was located,
//! built, promoted). It is separate from the verbosity-gated build output
//! pane that the host user sees, see [`crate::diagnostics`].
//!
//! # Example
//!
//! ```no_run
//! use solution_targets::util::logging;
//!
//! // Initialize from SOLUTION_TARGETS_LOG_LEVEL / SOLUTION_TARGETS_LOG_JSON
//! logging::init_from_env();
//!
//! tracing::debug!(solution = "App.sln", "Looking for targets file");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV_VAR: &str = "SOLUTION_TARGETS_LOG_LEVEL";
pub const LOG_JSON_ENV_VAR: &str = "SOLUTION_TARGETS_LOG_JSON";

const CRATE_TARGET: &str = "solution_targets";

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format (for structured logging in production)
    pub use_json: bool,

    /// Include the module target (e.g., solution_targets::prebuild) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    /// INFO level, console output, module targets, no location or thread ids.
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }

    /// Reads `SOLUTION_TARGETS_LOG_LEVEL` and `SOLUTION_TARGETS_LOG_JSON`.
    pub fn from_env() -> Self {
        let level_str = env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| "info".to_string());
        let use_json = env::var(LOG_JSON_ENV_VAR)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level: parse_level(&level_str),
            use_json,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string, case-insensitively.
///
/// Unknown values fall back to `Level::INFO`.
///
/// ```
/// use solution_targets::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Builds the filter: `RUST_LOG` when set, otherwise the crate at `level`
/// and everything else at warn.
fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let directives = format!("warn,{}={}", CRATE_TARGET, level);
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initializes the global subscriber. Only the first call has an effect.
///
/// Logs always go to stderr so stdout stays free for command output.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `SOLUTION_TARGETS_LOG_LEVEL`,
/// `SOLUTION_TARGETS_LOG_JSON` and `RUST_LOG`.
pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("invalid"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.include_target);
        assert!(!config.include_location);
        assert!(!config.include_thread_ids);
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert!(config.use_json);
        assert!(config.include_location);
        assert!(config.include_thread_ids);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.use_json);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        env::set_var(LOG_LEVEL_ENV_VAR, "warn");
        env::set_var(LOG_JSON_ENV_VAR, "true");

        let config = LoggingConfig::from_env();

        env::remove_var(LOG_LEVEL_ENV_VAR);
        env::remove_var(LOG_JSON_ENV_VAR);

        assert_eq!(config.level, Level::WARN);
        assert!(config.use_json);
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        env::remove_var(LOG_LEVEL_ENV_VAR);
        env::remove_var(LOG_JSON_ENV_VAR);

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
    }
}
