//! Build lifecycle coordination
//!
//! [`BuildCoordinator`] receives the host's solution-build callbacks and runs
//! the solution's targets definition once per build cycle, right before any
//! project builds. It owns every piece of cross-callback state: the pending
//! build action, the global property table, the diagnostic verbosity and the
//! cycle state.
//!
//! ```text
//!   begin ──► Updating ──start_update──► (locate, execute, harvest)
//!     ▲           │
//!     │      done / cancel
//!     └───────── Idle
//! ```
//!
//! Failures inside a cycle never stop the main build. Only an inconsistent
//! solution path is reported back as [`HostStatus::Unexpected`].

use super::action::BuildAction;
use super::executor::{ExecutorError, NoneTargetPolicy, PreBuildExecutor};
use super::harvester::PropertyHarvester;
use super::intent::IntentTracker;
use super::locator::TargetsLocator;
use crate::diagnostics::{DiagnosticLog, PaneBuildLogger};
use crate::engine::BuildEngine;
use crate::fs::FileSystem;
use crate::host::{
    read_verbosity, HostStatus, OutputPane, SettingsStore, SolutionHost, UpdateResponse,
};
use crate::properties::{GlobalPropertyTable, Property};
use crate::verbosity::Verbosity;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a coordinator could not be wired to its host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("No solution host available")]
    MissingHost,

    #[error("No build output pane available")]
    MissingPane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    Updating,
}

/// How the last `start_update` ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleOutcome {
    Inert,
    Cancelled,
    NoSolution,
    NoConfiguration,
    NoDefinition,
    UnexpectedState { message: String },
    Skipped,
    Unresolved { message: String },
    LoadFailed { message: String },
    BuildFailed { message: String },
    Built { succeeded: bool },
}

/// Summary of the last `start_update`.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub status: HostStatus,
    pub action: BuildAction,
    pub configuration: Option<String>,
    pub definition: Option<PathBuf>,
    pub outcome: CycleOutcome,
    pub promoted: Vec<Property>,
}

impl CycleReport {
    fn new(status: HostStatus, action: BuildAction, outcome: CycleOutcome) -> Self {
        Self {
            status,
            action,
            configuration: None,
            definition: None,
            outcome,
            promoted: Vec::new(),
        }
    }
}

/// Collaborators a live coordinator needs from its host.
pub struct HostServices {
    pub host: Box<dyn SolutionHost>,
    pub pane: Box<dyn OutputPane>,
    pub settings: Box<dyn SettingsStore>,
    pub engine: Box<dyn BuildEngine>,
    pub fs: Arc<dyn FileSystem>,
}

struct Live {
    host: Box<dyn SolutionHost>,
    settings: Box<dyn SettingsStore>,
    engine: Box<dyn BuildEngine>,
    locator: TargetsLocator,
    log: DiagnosticLog,
}

pub struct BuildCoordinator {
    live: Option<Live>,
    intent: IntentTracker,
    harvester: PropertyHarvester,
    globals: GlobalPropertyTable,
    none_target: NoneTargetPolicy,
    state: CycleState,
    cancelled: bool,
    verbosity_current: bool,
    last_report: Option<CycleReport>,
}

impl BuildCoordinator {
    pub fn new(services: HostServices) -> Self {
        let HostServices {
            host,
            pane,
            settings,
            engine,
            fs,
        } = services;

        let live = Live {
            host,
            settings,
            engine,
            locator: TargetsLocator::new(fs),
            log: DiagnosticLog::new(Some(pane), Verbosity::default()),
        };
        Self::with_live(Some(live))
    }

    /// A coordinator that accepts every callback and does nothing.
    pub fn inert() -> Self {
        Self::with_live(None)
    }

    /// Wires a coordinator from whatever the host could provide, falling back
    /// to an inert one when the host or its output pane is missing.
    pub fn initialize(
        host: Option<Box<dyn SolutionHost>>,
        pane: Option<Box<dyn OutputPane>>,
        settings: Box<dyn SettingsStore>,
        engine: Box<dyn BuildEngine>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let services = match (host, pane) {
            (None, _) => Err(EnvironmentError::MissingHost),
            (_, None) => Err(EnvironmentError::MissingPane),
            (Some(host), Some(pane)) => Ok(HostServices {
                host,
                pane,
                settings,
                engine,
                fs,
            }),
        };

        match services {
            Ok(services) => Self::new(services),
            Err(e) => {
                warn!(error = %e, "Pre-build targets disabled");
                Self::inert()
            }
        }
    }

    fn with_live(live: Option<Live>) -> Self {
        Self {
            live,
            intent: IntentTracker::new(),
            harvester: PropertyHarvester::default(),
            globals: GlobalPropertyTable::new(),
            none_target: NoneTargetPolicy::default(),
            state: CycleState::Idle,
            cancelled: false,
            verbosity_current: false,
            last_report: None,
        }
    }

    pub fn with_none_target(mut self, policy: NoneTargetPolicy) -> Self {
        self.none_target = policy;
        self
    }

    pub fn is_inert(&self) -> bool {
        self.live.is_none()
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn current_action(&self) -> BuildAction {
        self.intent.current_action()
    }

    pub fn global_properties(&self) -> &GlobalPropertyTable {
        &self.globals
    }

    pub fn verbosity(&self) -> Verbosity {
        self.live
            .as_ref()
            .map(|l| l.log.verbosity())
            .unwrap_or_default()
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }

    /// Command interception. Commands are never vetoed.
    pub fn on_before_command(&mut self, command_set: &str, command_id: i32) {
        self.intent.observe(command_set, command_id);
    }

    pub fn begin(&mut self) -> UpdateResponse {
        let Some(live) = self.live.as_mut() else {
            return UpdateResponse::proceed(HostStatus::Ok);
        };

        refresh_verbosity(live);
        self.verbosity_current = true;
        live.log.write_line(Verbosity::Diagnostic, "UpdateSolution_Begin");

        self.state = CycleState::Updating;
        self.cancelled = false;
        UpdateResponse::proceed(HostStatus::Ok)
    }

    pub fn start_update(&mut self) -> UpdateResponse {
        let status = self.run_cycle();
        UpdateResponse::proceed(status)
    }

    fn run_cycle(&mut self) -> HostStatus {
        let action = self.intent.current_action();
        let Some(live) = self.live.as_mut() else {
            self.last_report = Some(CycleReport::new(HostStatus::Ok, action, CycleOutcome::Inert));
            return HostStatus::Ok;
        };

        if self.cancelled {
            debug!("Update was cancelled, skipping targets file");
            self.last_report = Some(CycleReport::new(
                HostStatus::Ok,
                action,
                CycleOutcome::Cancelled,
            ));
            return HostStatus::Ok;
        }

        if !self.verbosity_current {
            refresh_verbosity(live);
            self.verbosity_current = true;
        }
        live.log.write_line(Verbosity::Detailed, "UpdateSolution_StartUpdate");

        let mut report = CycleReport::new(HostStatus::Ok, action, CycleOutcome::NoSolution);

        let Some(solution) = live.host.solution_path() else {
            debug!("No solution open");
            self.last_report = Some(report);
            return HostStatus::Ok;
        };

        let definition = match live.locator.locate(&solution) {
            Ok(Some(definition)) => definition,
            Ok(None) => {
                debug!(solution = %solution.display(), "No targets file for solution");
                report.outcome = CycleOutcome::NoDefinition;
                self.last_report = Some(report);
                return HostStatus::Ok;
            }
            Err(e) => {
                warn!(error = %e, "Cannot derive targets file path");
                report.status = HostStatus::Unexpected;
                report.outcome = CycleOutcome::UnexpectedState {
                    message: e.to_string(),
                };
                self.last_report = Some(report);
                return HostStatus::Unexpected;
            }
        };
        report.definition = Some(definition.path.clone());

        let Some(configuration) = live.host.active_configuration() else {
            live.log.write_line(
                Verbosity::Detailed,
                "no active solution configuration, skipping targets file",
            );
            report.outcome = CycleOutcome::NoConfiguration;
            self.last_report = Some(report);
            return HostStatus::Ok;
        };
        report.configuration = Some(configuration.clone());

        live.log.write_line(
            Verbosity::Detailed,
            &format!("active solution configuration name is \"{}\"", configuration),
        );

        let verbosity = live.log.verbosity();
        let executor = PreBuildExecutor::new(live.engine.as_ref(), self.none_target);
        let log = &live.log;
        let result = executor
            .resolve_target(&definition, action)
            .and_then(|request| {
                let Some(request) = request else {
                    return Ok(None);
                };
                log.write_line(
                    Verbosity::Diagnostic,
                    &format!("creating build logger with verbosity {}", verbosity),
                );
                log.write_line(
                    Verbosity::Detailed,
                    &format!(
                        "building targets file \"{}\", target \"{}\"",
                        definition.path.display(),
                        request
                    ),
                );
                let mut logger = PaneBuildLogger::new(log, verbosity, &definition.path);
                executor
                    .execute(&definition, request, &configuration, &mut logger)
                    .map(Some)
            });

        report.outcome = match result {
            Ok(None) => CycleOutcome::Skipped,
            Ok(Some(outcome)) => {
                if !outcome.succeeded {
                    live.log.write_line(
                        Verbosity::Minimal,
                        &format!("targets file \"{}\" failed to build", definition.path.display()),
                    );
                }
                report.promoted = self.harvester.harvest(
                    &outcome.properties,
                    outcome.watermark,
                    &mut self.globals,
                    &live.log,
                );
                info!(
                    path = %definition.path.display(),
                    succeeded = outcome.succeeded,
                    promoted = report.promoted.len(),
                    "Targets file finished"
                );
                CycleOutcome::Built {
                    succeeded: outcome.succeeded,
                }
            }
            Err(e) => {
                warn!(error = %e, "Targets file not run");
                let message = e.to_string();
                match e {
                    ExecutorError::Load { source, .. } => {
                        live.log.write_line(
                            Verbosity::Detailed,
                            &format!("failed to load targets file: {}", source),
                        );
                        CycleOutcome::LoadFailed { message }
                    }
                    ExecutorError::Execution { source, .. } => {
                        live.log.write_line(
                            Verbosity::Minimal,
                            &format!("failed to build targets file: {}", source),
                        );
                        CycleOutcome::BuildFailed { message }
                    }
                    ExecutorError::UnresolvedAction(_) => {
                        live.log.write_line(
                            Verbosity::Minimal,
                            "no build action known, targets file not run",
                        );
                        CycleOutcome::Unresolved { message }
                    }
                }
            }
        };

        self.last_report = Some(report);
        HostStatus::Ok
    }

    pub fn done(&mut self, succeeded: bool, modified: bool, cancelled: bool) -> HostStatus {
        if let Some(live) = self.live.as_ref() {
            live.log.write_line(Verbosity::Detailed, "UpdateSolution_Done");
        }
        debug!(succeeded, modified, cancelled, "Solution update done");

        self.intent.reset();
        self.state = CycleState::Idle;
        self.verbosity_current = false;
        HostStatus::Ok
    }

    pub fn cancel(&mut self) -> HostStatus {
        if let Some(live) = self.live.as_ref() {
            live.log.write_line(Verbosity::Detailed, "UpdateSolution_Cancel");
        }
        self.state = CycleState::Idle;
        self.cancelled = true;
        self.verbosity_current = false;
        HostStatus::Ok
    }

    pub fn active_project_configuration_changed(&mut self) -> HostStatus {
        if let Some(live) = self.live.as_ref() {
            live.log.write_line(Verbosity::Detailed, "OnActiveProjectCfgChange");
        }
        HostStatus::Ok
    }
}

fn refresh_verbosity(live: &mut Live) {
    match read_verbosity(live.settings.as_ref()) {
        Ok(verbosity) => live.log.set_verbosity(verbosity),
        Err(e) => warn!(
            error = %e,
            verbosity = %live.log.verbosity(),
            "Cannot read build output verbosity, keeping previous value"
        ),
    }
}
