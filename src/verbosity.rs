//! Build output verbosity
//!
//! Mirrors the host's `MSBuildOutputVerbosity` setting, an integer from 0 (quiet)
//! to 4 (diagnostic). Diagnostic lines declare the verbosity they need and are
//! only written when the configured value is at least that high.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet = 0,
    #[default]
    Minimal = 1,
    Normal = 2,
    Detailed = 3,
    Diagnostic = 4,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerbosityError {
    #[error("Verbosity level {0} is out of range (0=quiet .. 4=diagnostic)")]
    OutOfRange(i64),

    #[error("Invalid verbosity: {0}. Valid options: quiet, minimal, normal, detailed, diagnostic, 0-4")]
    Invalid(String),
}

impl Verbosity {
    pub const ALL: [Verbosity; 5] = [
        Verbosity::Quiet,
        Verbosity::Minimal,
        Verbosity::Normal,
        Verbosity::Detailed,
        Verbosity::Diagnostic,
    ];

    /// Returns true when a message declared at `level` should be written
    /// under this verbosity.
    pub fn allows(self, level: Verbosity) -> bool {
        self >= level
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Minimal => "minimal",
            Verbosity::Normal => "normal",
            Verbosity::Detailed => "detailed",
            Verbosity::Diagnostic => "diagnostic",
        }
    }
}

impl TryFrom<i64> for Verbosity {
    type Error = VerbosityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Verbosity::Quiet),
            1 => Ok(Verbosity::Minimal),
            2 => Ok(Verbosity::Normal),
            3 => Ok(Verbosity::Detailed),
            4 => Ok(Verbosity::Diagnostic),
            other => Err(VerbosityError::OutOfRange(other)),
        }
    }
}

impl FromStr for Verbosity {
    type Err = VerbosityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Verbosity::try_from(n);
        }

        match trimmed.to_lowercase().as_str() {
            "quiet" | "q" => Ok(Verbosity::Quiet),
            "minimal" | "m" => Ok(Verbosity::Minimal),
            "normal" | "n" => Ok(Verbosity::Normal),
            "detailed" | "d" => Ok(Verbosity::Detailed),
            "diagnostic" | "diag" => Ok(Verbosity::Diagnostic),
            _ => Err(VerbosityError::Invalid(s.to_string())),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Host setting values are capitalized ("Minimal", "Detailed")
        let name = match self {
            Verbosity::Quiet => "Quiet",
            Verbosity::Minimal => "Minimal",
            Verbosity::Normal => "Normal",
            Verbosity::Detailed => "Detailed",
            Verbosity::Diagnostic => "Diagnostic",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_setting_values() {
        assert!(Verbosity::Quiet < Verbosity::Minimal);
        assert!(Verbosity::Minimal < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Detailed);
        assert!(Verbosity::Detailed < Verbosity::Diagnostic);
    }

    #[test]
    fn test_allows() {
        assert!(Verbosity::Detailed.allows(Verbosity::Detailed));
        assert!(Verbosity::Detailed.allows(Verbosity::Quiet));
        assert!(!Verbosity::Minimal.allows(Verbosity::Detailed));
        assert!(Verbosity::Quiet.allows(Verbosity::Quiet));
    }

    #[test]
    fn test_try_from_integer_setting() {
        for (i, expected) in Verbosity::ALL.iter().enumerate() {
            assert_eq!(Verbosity::try_from(i as i64).unwrap(), *expected);
        }
        assert_eq!(
            Verbosity::try_from(5),
            Err(VerbosityError::OutOfRange(5))
        );
        assert_eq!(
            Verbosity::try_from(-1),
            Err(VerbosityError::OutOfRange(-1))
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Detailed".parse::<Verbosity>().unwrap(), Verbosity::Detailed);
        assert_eq!("diag".parse::<Verbosity>().unwrap(), Verbosity::Diagnostic);
        assert_eq!(" 2 ".parse::<Verbosity>().unwrap(), Verbosity::Normal);
        assert!("loud".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_display_and_as_str() {
        assert_eq!(Verbosity::Minimal.to_string(), "Minimal");
        assert_eq!(Verbosity::Minimal.as_str(), "minimal");
        assert_eq!(Verbosity::default(), Verbosity::Minimal);
    }
}
