pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{ActionsArgs, CliArgs, Commands, ConfigArgs, LocateArgs, RunArgs};
pub use output::{OutputFormat, OutputFormatter};
