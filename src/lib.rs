//! Smoke harness - sequential fail-fast smoke tests for example projects
//!
//! Each test case names a directory, a setup command and a run command.
//! Cases run strictly in order and the first non-zero exit ends the run.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use harness::{run_cases, ExitOutcome, Phase, Suite, TestCase};
