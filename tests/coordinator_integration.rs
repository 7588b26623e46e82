//! Build cycles against a real directory tree
//!
//! Each test lays out a solution folder in a temp dir and drives the
//! coordinator through the host callbacks in the order a host fires them.

use solution_targets::engine::XmlTargetsEngine;
use solution_targets::fs::{FileSystem, RealFileSystem};
use solution_targets::host::{
    FileSettings, FixedSettings, HostStatus, MemoryPane, SettingsStore, StaticSolution,
};
use solution_targets::prebuild::{BuildCoordinator, CycleOutcome, CycleState, HostServices};
use solution_targets::{BuildAction, Verbosity};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const STD97: &str = "{5EFC7975-14BC-11CF-9B2B-00AA00573819}";
const STD2K: &str = "{1496A755-94DE-11D0-8C3F-00C04FC2AAE2}";

fn coordinator_for(
    solution: &Path,
    settings: Box<dyn SettingsStore>,
) -> (BuildCoordinator, MemoryPane) {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let pane = MemoryPane::new();
    let coordinator = BuildCoordinator::new(HostServices {
        host: Box::new(StaticSolution::new(solution, "Debug|Any CPU")),
        pane: Box::new(pane.clone()),
        settings,
        engine: Box::new(XmlTargetsEngine::new(fs.clone())),
        fs,
    });
    (coordinator, pane)
}

fn solution_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let solution = dir.path().join("Big.Solution.sln");
    fs::write(&solution, "").unwrap();
    (dir, solution)
}

fn write_targets(dir: &TempDir, content: &str) {
    fs::write(dir.path().join("after.Big.Solution.sln.targets"), content).unwrap();
}

fn cycle(coordinator: &mut BuildCoordinator, command: (&str, i32)) -> HostStatus {
    coordinator.on_before_command(command.0, command.1);
    let begin = coordinator.begin();
    assert!(!begin.cancel_update);
    let status = coordinator.start_update().status;
    assert_eq!(coordinator.done(true, false, false), HostStatus::Ok);
    status
}

#[test]
fn test_configuration_and_ide_flag_are_visible_to_targets() {
    let (dir, solution) = solution_dir();
    write_targets(
        &dir,
        r#"<Project DefaultTargets="Build">
  <Target Name="Build">
    <Message Text="building" Importance="high" />
    <PropertyGroup>
      <CustomSeen>yes</CustomSeen>
    </PropertyGroup>
  </Target>
  <Target Name="Rebuild" DependsOnTargets="Build">
    <PropertyGroup><CustomRebuilt>yes</CustomRebuilt></PropertyGroup>
  </Target>
</Project>"#,
    );
    let (mut coordinator, pane) =
        coordinator_for(&solution, Box::new(FixedSettings(Verbosity::Normal)));

    assert_eq!(cycle(&mut coordinator, (STD2K, 1604)), HostStatus::Ok);

    let report = coordinator.last_report().unwrap();
    assert_eq!(report.action, BuildAction::Rebuild);
    assert_eq!(report.configuration.as_deref(), Some("Debug|Any CPU"));
    assert_eq!(report.outcome, CycleOutcome::Built { succeeded: true });

    let globals = coordinator.global_properties();
    assert_eq!(globals.get("CustomSeen"), Some("yes"));
    assert_eq!(globals.get("CustomRebuilt"), Some("yes"));
    assert!(globals.get("Configuration").is_none());
    assert!(globals.get("BuildingInsideVisualStudio").is_none());

    let lines = pane.lines();
    assert!(lines.iter().any(|l| l == "  building"));
    assert!(lines.iter().any(|l| l == "Build succeeded."));
}

#[test]
fn test_table_survives_across_cycles() {
    let (dir, solution) = solution_dir();
    let (mut coordinator, _pane) =
        coordinator_for(&solution, Box::new(FixedSettings(Verbosity::Quiet)));

    write_targets(
        &dir,
        r#"<Project><Target Name="Build"><PropertyGroup><CustomA>1</CustomA></PropertyGroup></Target></Project>"#,
    );
    cycle(&mut coordinator, (STD97, 882));

    write_targets(
        &dir,
        r#"<Project><Target Name="Build"><PropertyGroup><CustomB>2</CustomB></PropertyGroup></Target></Project>"#,
    );
    cycle(&mut coordinator, (STD97, 887));

    let globals = coordinator.global_properties();
    assert_eq!(globals.get("CustomA"), Some("1"));
    assert_eq!(globals.get("CustomB"), Some("2"));
    assert_eq!(coordinator.current_action(), BuildAction::None);
    assert_eq!(coordinator.state(), CycleState::Idle);
}

#[test]
fn test_build_id_counts_in_either_standard_set() {
    let (dir, solution) = solution_dir();
    write_targets(
        &dir,
        r#"<Project><Target Name="Build"><PropertyGroup><CustomBuilt>1</CustomBuilt></PropertyGroup></Target></Project>"#,
    );
    let (mut coordinator, _pane) =
        coordinator_for(&solution, Box::new(FixedSettings(Verbosity::Quiet)));

    cycle(&mut coordinator, (STD2K, 882));
    assert_eq!(coordinator.last_report().unwrap().action, BuildAction::Build);

    cycle(&mut coordinator, (STD97, 1603));
    assert_eq!(coordinator.last_report().unwrap().action, BuildAction::Build);
    assert_eq!(coordinator.global_properties().get("CustomBuilt"), Some("1"));
}

#[test]
fn test_targets_file_appearing_between_cycles() {
    let (dir, solution) = solution_dir();
    let (mut coordinator, _pane) =
        coordinator_for(&solution, Box::new(FixedSettings(Verbosity::Quiet)));

    cycle(&mut coordinator, (STD97, 882));
    assert_eq!(
        coordinator.last_report().unwrap().outcome,
        CycleOutcome::NoDefinition
    );

    write_targets(
        &dir,
        r#"<Project><Target Name="Build"><PropertyGroup><CustomLate>1</CustomLate></PropertyGroup></Target></Project>"#,
    );
    cycle(&mut coordinator, (STD97, 882));
    assert_eq!(coordinator.global_properties().get("CustomLate"), Some("1"));
}

#[test]
fn test_unsupported_construct_is_skipped_quietly() {
    let (dir, solution) = solution_dir();
    write_targets(
        &dir,
        r#"<Project>
  <PropertyGroup Condition="'$(Configuration)' == 'Debug'">
    <CustomDebugOnly>1</CustomDebugOnly>
  </PropertyGroup>
  <Target Name="Build" />
</Project>"#,
    );
    let (mut coordinator, pane) =
        coordinator_for(&solution, Box::new(FixedSettings(Verbosity::Minimal)));

    assert_eq!(cycle(&mut coordinator, (STD97, 882)), HostStatus::Ok);
    assert!(coordinator.global_properties().is_empty());
    assert!(matches!(
        coordinator.last_report().unwrap().outcome,
        CycleOutcome::LoadFailed { .. }
    ));
    assert!(pane.contents().is_empty());
}

#[test]
fn test_verbosity_follows_settings_file_between_cycles() {
    let (dir, solution) = solution_dir();
    write_targets(&dir, r#"<Project><Target Name="Build" /></Project>"#);
    let settings_path = dir.path().join("settings.toml");
    fs::write(
        &settings_path,
        "[projects_and_solution]\nmsbuild_output_verbosity = 0\n",
    )
    .unwrap();

    let (mut coordinator, pane) = coordinator_for(
        &solution,
        Box::new(FileSettings::new(&settings_path, Verbosity::Minimal)),
    );

    cycle(&mut coordinator, (STD97, 882));
    assert_eq!(coordinator.verbosity(), Verbosity::Quiet);
    assert!(pane.contents().is_empty());

    fs::write(
        &settings_path,
        "[projects_and_solution]\nmsbuild_output_verbosity = \"diagnostic\"\n",
    )
    .unwrap();
    cycle(&mut coordinator, (STD97, 882));

    assert_eq!(coordinator.verbosity(), Verbosity::Diagnostic);
    assert!(pane
        .lines()
        .iter()
        .any(|l| l == "CommonSolutionTargets: UpdateSolution_Begin"));
}

#[test]
fn test_missing_pane_gives_inert_coordinator() {
    let (dir, solution) = solution_dir();
    write_targets(
        &dir,
        r#"<Project><Target Name="Build"><PropertyGroup><CustomX>1</CustomX></PropertyGroup></Target></Project>"#,
    );
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());

    let mut coordinator = BuildCoordinator::initialize(
        Some(Box::new(StaticSolution::new(&solution, "Debug"))),
        None,
        Box::new(FixedSettings(Verbosity::Diagnostic)),
        Box::new(XmlTargetsEngine::new(fs.clone())),
        fs,
    );

    assert!(coordinator.is_inert());
    assert_eq!(cycle(&mut coordinator, (STD97, 882)), HostStatus::Ok);
    assert!(coordinator.global_properties().is_empty());
}
