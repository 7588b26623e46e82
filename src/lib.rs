//! solution-targets - per-solution pre-build targets
//!
//! A solution `App.sln` can carry a companion `after.App.sln.targets` file in
//! the same folder. Right before any project in the solution builds, that file
//! is run as an isolated build with the requested build action (Build,
//! Rebuild, Clean or Deploy) as its target. Properties it introduces whose
//! names start with `Custom` become global build properties for the rest of
//! the solution build.
//!
//! # Core Concepts
//!
//! - **Build intent**: the host announces commands before running them; build
//!   commands from the standard command sets decide the pending
//!   [`BuildAction`]
//! - **Targets definition**: `<solution folder>/after.<solution file>.targets`,
//!   looked up fresh every cycle
//! - **Build engine**: anything implementing [`BuildEngine`]; the crate ships
//!   a small XML engine
//! - **Global property table**: promoted properties, kept for the lifetime of
//!   the coordinator
//!
//! # Example Usage
//!
//! ```no_run
//! use solution_targets::engine::XmlTargetsEngine;
//! use solution_targets::fs::{FileSystem, RealFileSystem};
//! use solution_targets::host::{FixedSettings, StaticSolution, StderrPane};
//! use solution_targets::prebuild::{BuildCoordinator, HostServices};
//! use solution_targets::Verbosity;
//! use std::sync::Arc;
//!
//! let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
//! let mut coordinator = BuildCoordinator::new(HostServices {
//!     host: Box::new(StaticSolution::new("/src/App/App.sln", "Debug")),
//!     pane: Box::new(StderrPane),
//!     settings: Box::new(FixedSettings(Verbosity::Normal)),
//!     engine: Box::new(XmlTargetsEngine::new(fs.clone())),
//!     fs,
//! });
//!
//! coordinator.on_before_command("{5EFC7975-14BC-11CF-9B2B-00AA00573819}", 882);
//! coordinator.begin();
//! coordinator.start_update();
//! coordinator.done(true, false, false);
//!
//! for (name, value) in coordinator.global_properties().iter() {
//!     println!("{} = {}", name, value);
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`prebuild`]: intent tracking, location, execution, harvesting and the
//!   lifecycle coordinator
//! - [`engine`]: the build engine seam and the built-in XML engine
//! - [`host`]: solution host, output pane and settings abstractions
//! - [`diagnostics`]: verbosity-gated output to the build pane

// Public modules
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod fs;
pub mod host;
pub mod prebuild;
pub mod properties;
pub mod util;
pub mod verbosity;

// Re-export key types for convenient access
pub use config::{ConfigError, SolutionTargetsConfig};
pub use engine::{BuildEngine, DefinitionProject, EngineError, XmlTargetsEngine};
pub use host::{HostStatus, OutputPane, SettingsStore, SolutionHost};
pub use prebuild::{
    BuildAction, BuildCoordinator, CycleOutcome, CycleReport, HostServices, NoneTargetPolicy,
};
pub use properties::{GlobalPropertyTable, Property, PropertySet, Watermark};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use verbosity::Verbosity;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
