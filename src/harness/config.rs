//! Test suite configuration types
//!
//! Defines the data structures for deserializing YAML test suites and the
//! built-in suite that ships inside the binary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// The suite run when no other suite is configured
const BUILTIN_SUITE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/suites/workspaces.yaml"));

/// A named, ordered list of test cases loaded from YAML
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite verifies
    #[serde(default)]
    pub description: Option<String>,
    /// Directory that relative case directories are resolved against
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// The test cases, executed in order
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// One project's smoke test: a directory, a setup command and a run command
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Directory both commands run in
    #[serde(rename = "directory")]
    pub working_directory: PathBuf,
    /// Environment preparation step; empty means no setup
    #[serde(rename = "setup", default)]
    pub setup_command: Vec<String>,
    /// Verification step
    #[serde(rename = "run")]
    pub run_command: Vec<String>,
}

/// Which of a test case's two commands is executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Run,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Run => f.write_str("run"),
        }
    }
}

impl TestCase {
    pub fn new<P, S, R>(working_directory: P, setup_command: S, run_command: R) -> Self
    where
        P: Into<PathBuf>,
        S: IntoIterator,
        S::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            working_directory: working_directory.into(),
            setup_command: setup_command.into_iter().map(Into::into).collect(),
            run_command: run_command.into_iter().map(Into::into).collect(),
        }
    }

    /// The command tokens for a phase
    pub fn command(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Setup => &self.setup_command,
            Phase::Run => &self.run_command,
        }
    }
}

impl Suite {
    /// Parse the suite embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_SUITE)
    }

    /// Parse a suite from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        let suite: Suite = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse test suite: {}", e)))?;
        suite.validate()?;
        Ok(suite)
    }

    /// Load a suite from a YAML file
    ///
    /// A relative `root` is anchored at the directory containing the file,
    /// so a suite can be run from anywhere.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read test suite '{}': {}", path.display(), e))
        })?;
        let mut suite = Self::parse(&content)?;

        let suite_dir = path.parent().unwrap_or(Path::new("."));
        suite.root = Some(match suite.root.take() {
            Some(root) if root.is_relative() => suite_dir.join(root),
            Some(root) => root,
            None => suite_dir.to_path_buf(),
        });
        Ok(suite)
    }

    /// Produce the runnable case list
    ///
    /// `root_override` replaces the suite's own root. Absolute case
    /// directories are left untouched.
    pub fn resolve(&self, root_override: Option<&Path>) -> Vec<TestCase> {
        let root = root_override.or(self.root.as_deref());
        self.cases
            .iter()
            .map(|case| {
                let mut case = case.clone();
                if let Some(root) = root {
                    if case.working_directory.is_relative() {
                        case.working_directory = root.join(&case.working_directory);
                    }
                }
                case
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        for case in &self.cases {
            if case.run_command.is_empty() {
                return Err(Error::EmptyCommand {
                    directory: case.working_directory.clone(),
                });
            }
        }
        Ok(())
    }
}
