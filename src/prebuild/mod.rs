//! The pre-build step
//!
//! - [`intent`]: which build action the user asked for
//! - [`locator`]: where the solution's targets definition lives
//! - [`executor`]: running the definition through a [`crate::engine::BuildEngine`]
//! - [`harvester`]: promoting new `Custom*` properties to the global table
//! - [`coordinator`]: the build lifecycle state machine tying them together

pub mod action;
pub mod coordinator;
pub mod executor;
pub mod harvester;
pub mod intent;
pub mod locator;

pub use action::BuildAction;
pub use coordinator::{
    BuildCoordinator, CycleOutcome, CycleReport, CycleState, EnvironmentError, HostServices,
};
pub use executor::{
    ExecutionOutcome, ExecutorError, NoneTargetPolicy, PreBuildExecutor, TargetRequest,
    CONFIGURATION_PROPERTY, INSIDE_IDE_PROPERTY,
};
pub use harvester::{PropertyHarvester, RESERVED_PREFIX};
pub use intent::{BuildCommand, CommandSet, IntentTracker, BUILD_COMMANDS};
pub use locator::{LocateError, TargetsDefinition, TargetsLocator};
