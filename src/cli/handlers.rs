//! Subcommand handlers. Each returns the process exit code.

use super::commands::{ActionsArgs, ConfigArgs, LocateArgs, RunArgs};
use super::output::{LocateReport, OutputFormat, OutputFormatter, RunReport};
use crate::config::SolutionTargetsConfig;
use crate::engine::XmlTargetsEngine;
use crate::fs::{FileSystem, RealFileSystem};
use crate::host::{FixedSettings, HostStatus, SettingsStore, StaticSolution, StderrPane};
use crate::prebuild::{
    BuildAction, BuildCoordinator, CommandSet, HostServices, TargetsLocator, BUILD_COMMANDS,
};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const EXIT_OK: i32 = 0;
pub const EXIT_HOST_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}

fn print(output: Result<String>) -> i32 {
    match output {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            EXIT_OK
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_USAGE
        }
    }
}

pub fn handle_locate(args: &LocateArgs) -> i32 {
    let solution = match absolute(&args.solution) {
        Ok(path) => path,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_USAGE;
        }
    };
    debug!("Solution path: {}", solution.display());

    let locator = TargetsLocator::new(Arc::new(RealFileSystem::new()));
    let definition = match locator.describe(&solution) {
        Ok(definition) => definition,
        Err(e) => {
            error!("{}", e);
            return EXIT_HOST_FAILURE;
        }
    };

    let report = LocateReport {
        solution,
        exists: definition.as_ref().map(|d| d.exists).unwrap_or(false),
        targets_file: definition.map(|d| d.path),
    };

    print(OutputFormatter::new(OutputFormat::from(args.format)).format_locate(&report))
}

pub fn handle_run(args: &RunArgs) -> i32 {
    match run_cycle(args) {
        Ok((report, status)) => {
            let code = print(OutputFormatter::new(args.format.into()).format_run(&report));
            if code != EXIT_OK {
                return code;
            }
            if status.is_success() {
                EXIT_OK
            } else {
                EXIT_HOST_FAILURE
            }
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_USAGE
        }
    }
}

fn run_cycle(args: &RunArgs) -> Result<(RunReport, HostStatus)> {
    let config = SolutionTargetsConfig::from_env().context("Invalid configuration")?;
    let solution = absolute(&args.solution)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let settings: Box<dyn SettingsStore> = match args.verbosity {
        Some(verbosity) => Box::new(FixedSettings(verbosity)),
        None => config.settings_store(),
    };
    let none_target = args.none_target.unwrap_or(config.none_target);

    info!(
        solution = %solution.display(),
        configuration = %args.configuration,
        none_target = %none_target,
        "Running build cycle"
    );

    let mut coordinator = BuildCoordinator::new(HostServices {
        host: Box::new(StaticSolution::new(&solution, args.configuration.as_str())),
        pane: Box::new(StderrPane),
        settings,
        engine: Box::new(XmlTargetsEngine::new(fs.clone())),
        fs,
    })
    .with_none_target(none_target);

    for command in &args.commands {
        coordinator.on_before_command(&command.command_set, command.id);
    }
    if let Some(action) = args.action {
        observe_action(&mut coordinator, action);
    }

    let status = coordinator.begin().status;
    let status = if status.is_success() {
        coordinator.start_update().status
    } else {
        status
    };
    coordinator.done(status.is_success(), false, false);

    let cycle = coordinator
        .last_report()
        .cloned()
        .context("Build cycle produced no report")?;
    let global_properties = coordinator
        .global_properties()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Ok((
        RunReport {
            solution,
            cycle,
            global_properties,
        },
        status,
    ))
}

/// Feeds the solution-level command for `action`, the way the host would.
fn observe_action(coordinator: &mut BuildCoordinator, action: BuildAction) {
    let command = BUILD_COMMANDS
        .iter()
        .find(|c| c.action == action && c.set == CommandSet::Std97);
    if let Some(command) = command {
        let guid = command.set.guid().braced().to_string();
        coordinator.on_before_command(&guid, command.id);
    }
}

pub fn handle_actions(args: &ActionsArgs) -> i32 {
    print(OutputFormatter::new(args.format.into()).format_actions(BUILD_COMMANDS))
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = SolutionTargetsConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return EXIT_USAGE;
    }
    print(OutputFormatter::new(args.format.into()).format_config(&config))
}
