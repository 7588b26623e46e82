use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The build the user is about to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum BuildAction {
    #[default]
    None,
    Build,
    Rebuild,
    Clean,
    Deploy,
}

impl BuildAction {
    /// Target requested from the definition, `None` when no action is known.
    pub fn target_name(self) -> Option<&'static str> {
        match self {
            BuildAction::None => None,
            BuildAction::Build => Some("Build"),
            BuildAction::Rebuild => Some("Rebuild"),
            BuildAction::Clean => Some("Clean"),
            BuildAction::Deploy => Some("Deploy"),
        }
    }

    pub fn is_none(self) -> bool {
        self == BuildAction::None
    }
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target_name().unwrap_or("None"))
    }
}

impl FromStr for BuildAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "build" => Ok(BuildAction::Build),
            "rebuild" => Ok(BuildAction::Rebuild),
            "clean" => Ok(BuildAction::Clean),
            "deploy" => Ok(BuildAction::Deploy),
            "none" | "" => Ok(BuildAction::None),
            other => Err(format!(
                "Invalid build action: {}. Valid options: build, rebuild, clean, deploy, none",
                other
            )),
        }
    }
}
