//! Smoke-test harness
//!
//! Loads an ordered list of test cases (from the built-in suite or a YAML
//! file) and runs each case's setup and run commands in the case's
//! directory, stopping at the first failure.

mod config;
mod executor;
mod preflight;
mod runner;

pub use config::*;
pub use executor::{CommandExecutor, CommandStatus, ProcessExecutor};
pub use preflight::{check_cases, Issue};
pub use runner::{run_cases, ExitOutcome, Failure};
