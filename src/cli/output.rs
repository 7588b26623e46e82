//! Output formatting for multiple formats
//!
//! JSON and YAML output serialize the report types as they are; the human
//! format lays them out as short aligned blocks.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::SolutionTargetsConfig;
use crate::host::HostStatus;
use crate::prebuild::{BuildCommand, CycleOutcome, CycleReport};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Result of `locate`.
#[derive(Debug, Clone, Serialize)]
pub struct LocateReport {
    pub solution: PathBuf,
    pub targets_file: Option<PathBuf>,
    pub exists: bool,
}

/// Result of `run`: the cycle plus the global table it left behind.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub solution: PathBuf,
    pub cycle: CycleReport,
    pub global_properties: BTreeMap<String, String>,
}

/// One row of `actions`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRow {
    pub command_set: String,
    pub guid: String,
    pub id: i32,
    pub name: String,
    pub action: String,
}

impl From<&BuildCommand> for CommandRow {
    fn from(command: &BuildCommand) -> Self {
        Self {
            command_set: format!("{:?}", command.set),
            guid: format!("{{{}}}", command.set.guid().to_string().to_uppercase()),
            id: command.id,
            name: command.name.to_string(),
            action: command.action.to_string(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_run(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "run report"),
            OutputFormat::Yaml => to_yaml(report, "run report"),
            OutputFormat::Human => Ok(self.format_run_human(report)),
        }
    }

    pub fn format_locate(&self, report: &LocateReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "locate report"),
            OutputFormat::Yaml => to_yaml(report, "locate report"),
            OutputFormat::Human => Ok(self.format_locate_human(report)),
        }
    }

    pub fn format_actions(&self, commands: &[BuildCommand]) -> Result<String> {
        let rows: Vec<CommandRow> = commands.iter().map(CommandRow::from).collect();
        match self.format {
            OutputFormat::Json => to_json(&rows, "command table"),
            OutputFormat::Yaml => to_yaml(&rows, "command table"),
            OutputFormat::Human => Ok(self.format_actions_human(&rows)),
        }
    }

    pub fn format_config(&self, config: &SolutionTargetsConfig) -> Result<String> {
        let map: BTreeMap<String, String> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => to_json(&map, "config"),
            OutputFormat::Yaml => to_yaml(&map, "config"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_run_human(&self, report: &RunReport) -> String {
        let cycle = &report.cycle;
        let mut output = String::new();

        let mark = if cycle.status == HostStatus::Ok {
            "\u{2713}"
        } else {
            "\u{2717}"
        };
        output.push_str(&format!("{} Solution Targets Cycle\n", mark));
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Solution:       {}\n", report.solution.display()));
        output.push_str(&format!("Status:         {:?}\n", cycle.status));
        output.push_str(&format!("Action:         {}\n", cycle.action));
        if let Some(ref configuration) = cycle.configuration {
            output.push_str(&format!("Configuration:  {}\n", configuration));
        }
        match cycle.definition {
            Some(ref path) => {
                output.push_str(&format!("Targets File:   {}\n", path.display()));
            }
            None => output.push_str("Targets File:   (none)\n"),
        }
        output.push_str(&format!("Outcome:        {}\n\n", describe_outcome(&cycle.outcome)));

        output.push_str("Promoted Properties:\n");
        push_tree(
            &mut output,
            cycle
                .promoted
                .iter()
                .map(|p| format!("{} = {}", p.name, p.value)),
        );

        output.push_str("\nGlobal Properties:\n");
        push_tree(
            &mut output,
            report
                .global_properties
                .iter()
                .map(|(k, v)| format!("{} = {}", k, v)),
        );

        output
    }

    fn format_locate_human(&self, report: &LocateReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("Solution:      {}\n", report.solution.display()));
        match report.targets_file {
            Some(ref path) => {
                let state = if report.exists { "found" } else { "not found" };
                output.push_str(&format!("Targets File:  {} ({})\n", path.display(), state));
            }
            None => output.push_str("Targets File:  (solution has no folder)\n"),
        }
        output
    }

    fn format_actions_human(&self, rows: &[CommandRow]) -> String {
        let mut output = String::new();
        output.push_str("Build Commands\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
        for row in rows {
            output.push_str(&format!(
                "{:<8} {:>5}  {:<width$}  {}\n",
                row.action,
                row.id,
                row.name,
                row.guid,
                width = name_width
            ));
        }
        output
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

fn push_tree(output: &mut String, lines: impl ExactSizeIterator<Item = String>) {
    let count = lines.len();
    if count == 0 {
        output.push_str("\u{2514}\u{2500} (none)\n");
        return;
    }
    for (i, line) in lines.enumerate() {
        let connector = if i + 1 == count { "\u{2514}" } else { "\u{251C}" };
        output.push_str(&format!("{}\u{2500} {}\n", connector, line));
    }
}

fn describe_outcome(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::Inert => "inert (no host)".to_string(),
        CycleOutcome::Cancelled => "cancelled".to_string(),
        CycleOutcome::NoSolution => "no solution open".to_string(),
        CycleOutcome::NoConfiguration => "no active configuration".to_string(),
        CycleOutcome::NoDefinition => "no targets file".to_string(),
        CycleOutcome::UnexpectedState { message } => format!("unexpected state: {}", message),
        CycleOutcome::Skipped => "skipped (no build action)".to_string(),
        CycleOutcome::Unresolved { message } => format!("not run: {}", message),
        CycleOutcome::LoadFailed { message } => format!("load failed: {}", message),
        CycleOutcome::BuildFailed { message } => format!("build failed: {}", message),
        CycleOutcome::Built { succeeded: true } => "built".to_string(),
        CycleOutcome::Built { succeeded: false } => "built with errors".to_string(),
    }
}
