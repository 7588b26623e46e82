use crate::prebuild::{BuildAction, NoneTargetPolicy};
use crate::verbosity::Verbosity;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Runs a solution's `after.<solution>.targets` file ahead of the main build
#[derive(Parser, Debug)]
#[command(
    name = "solution-targets",
    about = "Runs a solution's after.<solution>.targets file ahead of the main build",
    version,
    author,
    long_about = "solution-targets locates the targets file that sits next to a solution, \
                  runs it with the requested build action as its target and promotes any \
                  new Custom* properties to global build properties. The run command drives \
                  one simulated build cycle with the built-in targets engine."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Show where a solution's targets file is expected",
        long_about = "Derives <solution folder>/after.<solution file name>.targets and reports \
                      whether it exists.\n\n\
                      Examples:\n  \
                      solution-targets locate App.sln\n  \
                      solution-targets locate /src/App/App.sln --format json"
    )]
    Locate(LocateArgs),

    #[command(
        about = "Run one build cycle for a solution",
        long_about = "Simulates the host: observes the given commands, then begins, starts and \
                      finishes a solution update. The targets file's output goes to stderr, \
                      gated by the build output verbosity.\n\n\
                      Examples:\n  \
                      solution-targets run App.sln\n  \
                      solution-targets run App.sln -c Release -a rebuild\n  \
                      solution-targets run App.sln --command {5EFC7975-14BC-11CF-9B2B-00AA00573819}:885\n  \
                      solution-targets run App.sln --verbosity diagnostic --format yaml"
    )]
    Run(RunArgs),

    #[command(
        about = "List the commands that set a build action",
        long_about = "Lists every (command set, command id) pair that is recognized as a build, \
                      rebuild, clean or deploy request.\n\n\
                      Examples:\n  \
                      solution-targets actions\n  \
                      solution-targets actions --format json"
    )]
    Actions(ActionsArgs),

    #[command(
        about = "Show the effective configuration",
        long_about = "Prints the configuration assembled from SOLUTION_TARGETS_* environment \
                      variables and defaults.\n\n\
                      Examples:\n  \
                      solution-targets config\n  \
                      solution-targets config --format yaml"
    )]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct LocateArgs {
    #[arg(value_name = "SOLUTION", help = "Path to the solution file")]
    pub solution: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[arg(value_name = "SOLUTION", help = "Path to the solution file")]
    pub solution: PathBuf,

    #[arg(
        short = 'c',
        long,
        value_name = "NAME",
        default_value = "Debug",
        help = "Active solution configuration"
    )]
    pub configuration: String,

    #[arg(
        short = 'a',
        long,
        value_name = "ACTION",
        help = "Build action to request (build, rebuild, clean, deploy)"
    )]
    pub action: Option<BuildAction>,

    #[arg(
        long = "command",
        value_name = "GUID:ID",
        value_parser = parse_command,
        help = "Command to observe before the cycle starts (repeatable)"
    )]
    pub commands: Vec<ObservedCommand>,

    #[arg(
        long,
        value_name = "LEVEL",
        help = "Build output verbosity (quiet, minimal, normal, detailed, diagnostic or 0-4)"
    )]
    pub verbosity: Option<Verbosity>,

    #[arg(
        long,
        value_name = "POLICY",
        help = "When no build action is known: default, skip or error"
    )]
    pub none_target: Option<NoneTargetPolicy>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ActionsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

/// A `GUID:ID` pair given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCommand {
    pub command_set: String,
    pub id: i32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_command(s: &str) -> Result<ObservedCommand, String> {
    let (guid, id) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("Invalid command: {}. Expected GUID:ID", s))?;
    let id = id
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("Invalid command id '{}': {}", id, e))?;

    Ok(ObservedCommand {
        command_set: guid.trim().to_string(),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_run_args() {
        let args = CliArgs::parse_from(["solution-targets", "run", "App.sln"]);
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.solution, PathBuf::from("App.sln"));
                assert_eq!(run.configuration, "Debug");
                assert_eq!(run.action, None);
                assert!(run.commands.is_empty());
                assert_eq!(run.verbosity, None);
                assert_eq!(run.none_target, None);
                assert_eq!(run.format, OutputFormatArg::Human);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_with_options() {
        let args = CliArgs::parse_from([
            "solution-targets",
            "run",
            "/src/App.sln",
            "-c",
            "Release|x64",
            "-a",
            "rebuild",
            "--command",
            "{5EFC7975-14BC-11CF-9B2B-00AA00573819}:885",
            "--verbosity",
            "3",
            "--none-target",
            "skip",
            "-f",
            "json",
        ]);
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.configuration, "Release|x64");
                assert_eq!(run.action, Some(BuildAction::Rebuild));
                assert_eq!(
                    run.commands,
                    vec![ObservedCommand {
                        command_set: "{5EFC7975-14BC-11CF-9B2B-00AA00573819}".to_string(),
                        id: 885,
                    }]
                );
                assert_eq!(run.verbosity, Some(Verbosity::Detailed));
                assert_eq!(run.none_target, Some(NoneTargetPolicy::Skip));
                assert_eq!(run.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_locate_args() {
        let args = CliArgs::parse_from(["solution-targets", "locate", "App.sln", "-f", "yaml"]);
        match args.command {
            Commands::Locate(locate) => {
                assert_eq!(locate.solution, PathBuf::from("App.sln"));
                assert_eq!(locate.format, OutputFormatArg::Yaml);
            }
            _ => panic!("Expected Locate command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["solution-targets", "actions", "-v"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["solution-targets", "--log-level", "trace", "config"]);
        assert_eq!(args.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = CliArgs::try_parse_from(["solution-targets", "actions", "-v", "-q"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(CliArgs::try_parse_from(["solution-targets", "run", "A.sln", "-a", "publish"]).is_err());
        assert!(
            CliArgs::try_parse_from(["solution-targets", "run", "A.sln", "--verbosity", "7"]).is_err()
        );
        assert!(
            CliArgs::try_parse_from(["solution-targets", "run", "A.sln", "--command", "882"]).is_err()
        );
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("{1496A755-94DE-11D0-8C3F-00C04FC2AAE2}:1603").unwrap(),
            ObservedCommand {
                command_set: "{1496A755-94DE-11D0-8C3F-00C04FC2AAE2}".to_string(),
                id: 1603,
            }
        );
        assert!(parse_command("guid:abc").is_err());
        assert!(parse_command("no-separator").is_err());
    }
}
