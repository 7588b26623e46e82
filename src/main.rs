use solution_targets::cli::commands::{CliArgs, Commands};
use solution_targets::cli::handlers::{handle_actions, handle_config, handle_locate, handle_run};
use solution_targets::util::logging::{self, parse_level, LoggingConfig};
use solution_targets::{NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Locate(locate_args) => handle_locate(locate_args),
        Commands::Run(run_args) => handle_run(run_args),
        Commands::Actions(actions_args) => handle_actions(actions_args),
        Commands::Config(config_args) => handle_config(config_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    logging::init_logging(config);
}
