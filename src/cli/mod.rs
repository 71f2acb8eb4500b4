mod commands;
pub mod exit_codes;
mod output;

pub use commands::{Cli, CliError};

/// run the parsed command line, returning the process exit code
pub fn run(cli: Cli) -> i32 {
    commands::execute(cli)
}
