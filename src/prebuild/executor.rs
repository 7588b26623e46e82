//! Pre-build execution of a targets definition

use super::action::BuildAction;
use super::locator::TargetsDefinition;
use crate::engine::{BuildEngine, BuildLogger, EngineError};
use crate::properties::{PropertySet, Watermark};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Seeded with the active solution configuration name.
pub const CONFIGURATION_PROPERTY: &str = "Configuration";

/// Seeded with `true` so definitions can tell they run inside the IDE.
pub const INSIDE_IDE_PROPERTY: &str = "BuildingInsideVisualStudio";

/// What to do when a definition must run but no build action was observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoneTargetPolicy {
    /// Request no target; the engine falls back to the definition's default targets.
    #[default]
    DefaultTarget,
    /// Leave the definition alone for this cycle.
    Skip,
    /// Report the cycle as failed (the main build still proceeds).
    Error,
}

impl FromStr for NoneTargetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" | "default_target" | "default-target" => Ok(NoneTargetPolicy::DefaultTarget),
            "skip" => Ok(NoneTargetPolicy::Skip),
            "error" => Ok(NoneTargetPolicy::Error),
            other => Err(format!(
                "Invalid none-target policy: {}. Valid options: default, skip, error",
                other
            )),
        }
    }
}

impl fmt::Display for NoneTargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoneTargetPolicy::DefaultTarget => "default",
            NoneTargetPolicy::Skip => "skip",
            NoneTargetPolicy::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Failed to load targets file {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("Failed to build targets file {path:?}: {source}")]
    Execution {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("No build action is known for targets file {0:?}")]
    UnresolvedAction(PathBuf),
}

/// Result of running a definition: its final properties plus the watermark
/// taken right after seeding.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub definition: PathBuf,
    pub target: Option<String>,
    pub properties: PropertySet,
    pub watermark: Watermark,
    pub succeeded: bool,
}

impl ExecutionOutcome {
    /// Count of properties present before the build ran.
    pub fn pre_count(&self) -> usize {
        self.watermark.0
    }
}

/// The target a definition is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRequest {
    Named(&'static str),
    /// No target requested; the definition's default targets run.
    Default,
}

impl TargetRequest {
    pub fn name(self) -> Option<&'static str> {
        match self {
            TargetRequest::Named(name) => Some(name),
            TargetRequest::Default => None,
        }
    }
}

impl fmt::Display for TargetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("<default>"))
    }
}

pub struct PreBuildExecutor<'e> {
    engine: &'e dyn BuildEngine,
    none_target: NoneTargetPolicy,
}

impl<'e> PreBuildExecutor<'e> {
    pub fn new(engine: &'e dyn BuildEngine, none_target: NoneTargetPolicy) -> Self {
        Self {
            engine,
            none_target,
        }
    }

    /// Picks the target for `action`.
    ///
    /// Returns `Ok(None)` when the none-target policy skips the run.
    pub fn resolve_target(
        &self,
        definition: &TargetsDefinition,
        action: BuildAction,
    ) -> Result<Option<TargetRequest>, ExecutorError> {
        match (action.target_name(), self.none_target) {
            (Some(name), _) => Ok(Some(TargetRequest::Named(name))),
            (None, NoneTargetPolicy::DefaultTarget) => Ok(Some(TargetRequest::Default)),
            (None, NoneTargetPolicy::Skip) => {
                debug!(path = %definition.path.display(), "No build action, skipping targets file");
                Ok(None)
            }
            (None, NoneTargetPolicy::Error) => {
                Err(ExecutorError::UnresolvedAction(definition.path.clone()))
            }
        }
    }

    /// Loads, seeds and builds `definition`.
    pub fn execute(
        &self,
        definition: &TargetsDefinition,
        request: TargetRequest,
        configuration: &str,
        logger: &mut dyn BuildLogger,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let target = request.name();

        let mut project = self
            .engine
            .load(&definition.path)
            .map_err(|source| ExecutorError::Load {
                path: definition.path.clone(),
                source,
            })?;

        project.set_property(CONFIGURATION_PROPERTY, configuration);
        project.set_property(INSIDE_IDE_PROPERTY, "true");
        let watermark = project.properties().watermark();

        info!(
            path = %definition.path.display(),
            requested_target = %request,
            configuration,
            "Building targets file"
        );

        let succeeded =
            project
                .build(target, logger)
                .map_err(|source| ExecutorError::Execution {
                    path: definition.path.clone(),
                    source,
                })?;

        Ok(ExecutionOutcome {
            definition: definition.path.clone(),
            target: target.map(str::to_string),
            properties: project.properties().clone(),
            watermark,
            succeeded,
        })
    }
}
