//! CLI command definitions

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every test case, stopping at the first failure (default)
    Run(RunArgs),

    /// List the test cases of a suite without running them
    List {
        #[command(flatten)]
        suite: SuiteArgs,

        /// Directory that relative case directories resolve against
        #[arg(long)]
        root: Option<PathBuf>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that directories and programs exist without running anything
    Check {
        #[command(flatten)]
        suite: SuiteArgs,

        /// Directory that relative case directories resolve against
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

/// Options for the `run` command
#[derive(Args, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Directory that relative case directories resolve against
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Kill any command running longer than this many seconds (0 disables)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Discard output from the commands under test
    #[arg(long, short)]
    pub quiet: bool,
}

/// Selects which suite to load
#[derive(Args, Default)]
pub struct SuiteArgs {
    /// Path to a YAML suite file (defaults to the built-in suite)
    #[arg(long, short)]
    pub suite: Option<PathBuf>,
}
