//! Smoke harness - runs each example project's setup and check commands
//!
//! Running with no arguments executes the built-in suite and exits non-zero
//! at the first failing case.

use clap::Parser;
use smoke_harness::{cli, commands::Commands, common::logging};

#[derive(Parser)]
#[command(name = "smoke-harness", about = "Sequential fail-fast smoke tests for example projects")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    match cli::dispatch(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
