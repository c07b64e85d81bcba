//! Intake checker CLI.

use clap::Parser;
use intake_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_check, run_datasets};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(2);
    }
    let exit_code = match &cli.command {
        Command::Check(args) => match run_check(args, cli.config.as_deref()) {
            Ok(outcome) => {
                print_summary(&outcome);
                i32::from(outcome.has_errors())
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                2
            }
        },
        Command::Datasets => match run_datasets(cli.config.as_deref()) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                2
            }
        },
    };
    std::process::exit(exit_code);
}
