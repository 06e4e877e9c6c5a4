//! Error types for the smoke harness
//!
//! Every error raised while executing a test case is terminal to the whole
//! run. Messages name the case directory and the command so the failing
//! example can be found from the last line of output.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::harness::Phase;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the smoke harness
#[derive(Error, Debug)]
pub enum Error {
    // === Test Case Errors ===
    #[error("Working directory '{}' does not exist", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error(
        "Setup command `{command}` failed in '{}' ({})",
        directory.display(),
        describe_status(*status)
    )]
    SetupFailed {
        directory: PathBuf,
        command: String,
        status: Option<i32>,
    },

    #[error(
        "Run command `{command}` failed in '{}' ({})",
        directory.display(),
        describe_status(*status)
    )]
    RunFailed {
        directory: PathBuf,
        command: String,
        status: Option<i32>,
    },

    #[error("Failed to launch `{command}` in '{}': {source}", directory.display())]
    SpawnError {
        directory: PathBuf,
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Test case in '{}' has an empty run command", directory.display())]
    EmptyCommand { directory: PathBuf },

    // === Process Control Errors ===
    #[error("Command `{command}` timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("Interrupted at `{command}`")]
    Interrupted { command: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create the failure error for a command that exited unsuccessfully
    pub fn command_failed(
        phase: Phase,
        directory: &Path,
        command: &str,
        status: Option<i32>,
    ) -> Self {
        let directory = directory.to_path_buf();
        let command = command.to_string();
        match phase {
            Phase::Setup => Self::SetupFailed {
                directory,
                command,
                status,
            },
            Phase::Run => Self::RunFailed {
                directory,
                command,
                status,
            },
        }
    }

    /// Create a spawn error for a command that could not be launched
    pub fn spawn_failed(directory: &Path, command: &str, source: io::Error) -> Self {
        Self::SpawnError {
            directory: directory.to_path_buf(),
            command: command.to_string(),
            source,
        }
    }

    /// Create a file read error
    pub fn file_read(path: &Path, error: io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
