//! Building-permit seasonal adjustment CLI.

use clap::Parser;
use permit_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_adjust, run_aggregate, run_list_series};
use crate::summary::print_run_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = cli.log_config();
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Run(args) => match run_adjust(&args) {
            Ok(report) => {
                print_run_summary(&report);
                i32::from(report.has_failures())
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Series(args) => match run_list_series(&args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Aggregate(args) => match run_aggregate(&args) {
            Ok(path) => {
                println!("Wrote {}", path.display());
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}
