//! Static checks that run without spawning anything
//!
//! Confirms every case directory exists and every program can be found,
//! so a broken suite is caught before a long build starts.

use std::path::PathBuf;

use crate::common::paths::resolve_program;

use super::config::{Phase, TestCase};

/// A problem found in one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// The working directory is missing
    MissingDirectory { index: usize, directory: PathBuf },
    /// A command's program is not on `PATH` or at the given path
    MissingProgram {
        index: usize,
        directory: PathBuf,
        phase: Phase,
        program: String,
    },
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::MissingDirectory { index, directory } => {
                write!(f, "case {}: directory '{}' does not exist", index + 1, directory.display())
            }
            Issue::MissingProgram {
                index,
                directory,
                phase,
                program,
            } => write!(
                f,
                "case {} ({}): {} program '{}' not found",
                index + 1,
                directory.display(),
                phase,
                program
            ),
        }
    }
}

/// Collect every issue across all cases
///
/// Unlike a run, this does not stop at the first problem.
pub fn check_cases(cases: &[TestCase]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (index, case) in cases.iter().enumerate() {
        let directory = &case.working_directory;
        if !directory.is_dir() {
            issues.push(Issue::MissingDirectory {
                index,
                directory: directory.clone(),
            });
            continue;
        }

        for phase in [Phase::Setup, Phase::Run] {
            let Some(program) = case.command(phase).first() else {
                continue;
            };
            if resolve_program(program, directory).is_none() {
                issues.push(Issue::MissingProgram {
                    index,
                    directory: directory.clone(),
                    phase,
                    program: program.clone(),
                });
            }
        }
    }

    issues
}
