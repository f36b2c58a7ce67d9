//! Agent SOP CLI Binary

use agent_sop::logging::init_logging;
use agent_sop::tooling::cli::{Cli, CliContext};
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let logging = cli.logging_config(&context.config().logging);
    if let Err(e) = init_logging(Some(&logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }
    let context = context.with_logging(logging);

    match context.execute(&cli.command) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
