mod analyze_cmd;
mod cli;
mod config;
mod convert;
mod engineer_cmd;
mod errors_cmd;
mod logging;
mod persistence_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Engineer(args) => engineer_cmd::run(args),
        Command::Persistence(args) => persistence_cmd::run(args),
        Command::Analyze(args) => analyze_cmd::run(args),
        Command::Errors(args) => errors_cmd::run(args),
    }
}
