//! Curator CLI Binary
//!
//! Command-line interface for the artifact repository sync system.

use clap::Parser;
use curator::cli::{Cli, CliContext};
use curator::logging;
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    let logging_config = cli.logging_config(context.config());
    if let Err(e) = logging::init_logging(cli.log_file.clone(), Some(&logging_config)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
