//! Harness runner implementation
//!
//! Executes test cases strictly in order and stops at the first failure.
//! Each command gets its case directory as an explicit working directory;
//! the harness never changes its own current directory.

use std::path::PathBuf;

use colored::Colorize;

use crate::common::{render_command, Error};

use super::config::{Phase, TestCase};
use super::executor::CommandExecutor;

/// Result of a harness run
#[derive(Debug)]
pub enum ExitOutcome {
    /// Every command of every case exited zero
    Success { cases_run: usize },
    /// The first failing case; later cases were not started
    Failure(Failure),
}

/// Where and why a run stopped
#[derive(Debug)]
pub struct Failure {
    /// Position of the failing case in the list
    pub index: usize,
    /// Working directory of the failing case
    pub directory: PathBuf,
    /// Failing phase, `None` when the case never got to run a command
    pub phase: Option<Phase>,
    pub error: Error,
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success { .. })
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitOutcome::Success { .. } => 0,
            ExitOutcome::Failure(_) => 1,
        }
    }
}

/// Run test cases in order, halting on the first failure
pub async fn run_cases<E>(cases: &[TestCase], executor: &mut E) -> ExitOutcome
where
    E: CommandExecutor + ?Sized,
{
    let total = cases.len();
    tracing::info!(cases = total, "Starting harness run");

    for (index, case) in cases.iter().enumerate() {
        println!(
            "\n{} [{}/{}] {}",
            "Case".blue().bold(),
            index + 1,
            total,
            case.working_directory.display().to_string().white().bold()
        );

        if let Err((phase, error)) = run_case(case, executor).await {
            let label = phase.map_or_else(|| "precheck".to_string(), |p| p.to_string());
            println!("  {} {}: {}", "✗".red(), label, error);
            tracing::error!(
                index,
                directory = %case.working_directory.display(),
                phase = %label,
                "Test case failed"
            );

            return ExitOutcome::Failure(Failure {
                index,
                directory: case.working_directory.clone(),
                phase,
                error,
            });
        }
    }

    println!(
        "\n{} {}\n",
        "✓".green().bold(),
        format!("{} test case(s) passed", total).green().bold()
    );

    ExitOutcome::Success { cases_run: total }
}

async fn run_case<E>(case: &TestCase, executor: &mut E) -> Result<(), (Option<Phase>, Error)>
where
    E: CommandExecutor + ?Sized,
{
    let directory = &case.working_directory;

    if !executor.directory_exists(directory) {
        return Err((None, Error::DirectoryNotFound { path: directory.clone() }));
    }
    if case.run_command.is_empty() {
        return Err((Some(Phase::Run), Error::EmptyCommand { directory: directory.clone() }));
    }

    for phase in [Phase::Setup, Phase::Run] {
        let argv = case.command(phase);
        if argv.is_empty() {
            tracing::debug!(directory = %directory.display(), "No setup command");
            continue;
        }

        let rendered = render_command(argv);
        println!("  {} {}", format!("{phase}:").cyan(), rendered.dimmed());

        let status = executor
            .execute(directory, argv)
            .await
            .map_err(|e| (Some(phase), e))?;

        if !status.success() {
            return Err((
                Some(phase),
                Error::command_failed(phase, directory, &rendered, status.code),
            ));
        }
        println!("  {} {}", "✓".green(), rendered.dimmed());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::executor::CommandStatus;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::Path;

    /// Records invocations without touching the filesystem
    ///
    /// `true` exits 0, `false` exits 1, `missing` cannot be spawned,
    /// `interrupt` behaves as if the operator stopped the run, and `exit:N`
    /// exits N.
    #[derive(Default)]
    struct RecordingExecutor {
        calls: Vec<(PathBuf, Vec<String>)>,
        missing_dirs: HashSet<PathBuf>,
    }

    #[async_trait]
    impl CommandExecutor for RecordingExecutor {
        async fn execute(&mut self, cwd: &Path, argv: &[String]) -> crate::Result<CommandStatus> {
            self.calls.push((cwd.to_path_buf(), argv.to_vec()));
            match argv[0].as_str() {
                "true" => Ok(CommandStatus::from_code(0)),
                "false" => Ok(CommandStatus::from_code(1)),
                "interrupt" => Err(Error::Interrupted {
                    command: argv.join(" "),
                }),
                "missing" => Err(Error::spawn_failed(
                    cwd,
                    "missing",
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                )),
                other => {
                    let code = other
                        .strip_prefix("exit:")
                        .and_then(|n| n.parse().ok())
                        .unwrap_or(0);
                    Ok(CommandStatus::from_code(code))
                }
            }
        }

        fn directory_exists(&self, path: &Path) -> bool {
            !self.missing_dirs.contains(path)
        }
    }

    impl RecordingExecutor {
        fn dirs(&self) -> Vec<&str> {
            self.calls.iter().map(|(d, _)| d.to_str().unwrap()).collect()
        }

        fn programs(&self) -> Vec<&str> {
            self.calls.iter().map(|(_, a)| a[0].as_str()).collect()
        }
    }

    fn case(dir: &str, setup: &[&str], run: &[&str]) -> TestCase {
        TestCase::new(dir, setup.iter().copied(), run.iter().copied())
    }

    #[tokio::test]
    async fn test_all_success_runs_every_command_in_order() {
        let cases = vec![
            case("dirA", &["true", "a-setup"], &["true", "a-run"]),
            case("dirB", &["true", "b-setup"], &["true", "b-run"]),
        ];
        let mut executor = RecordingExecutor::default();

        let outcome = run_cases(&cases, &mut executor).await;

        assert!(matches!(outcome, ExitOutcome::Success { cases_run: 2 }));
        assert_eq!(outcome.exit_code(), 0);
        let args: Vec<&str> = executor.calls.iter().map(|(_, a)| a[1].as_str()).collect();
        assert_eq!(args, ["a-setup", "a-run", "b-setup", "b-run"]);
        assert_eq!(executor.dirs(), ["dirA", "dirA", "dirB", "dirB"]);
    }

    #[tokio::test]
    async fn test_empty_list_succeeds() {
        let mut executor = RecordingExecutor::default();
        let outcome = run_cases(&[], &mut executor).await;
        assert!(matches!(outcome, ExitOutcome::Success { cases_run: 0 }));
        assert!(executor.calls.is_empty());
    }

    #[tokio::test]
    async fn test_run_failure_stops_before_later_cases() {
        let cases = vec![
            case("dirA", &["true"], &["true"]),
            case("dirB", &["true"], &["false"]),
            case("dirC", &["true"], &["true"]),
        ];
        let mut executor = RecordingExecutor::default();

        let outcome = run_cases(&cases, &mut executor).await;

        assert_eq!(executor.dirs(), ["dirA", "dirA", "dirB", "dirB"]);
        match outcome {
            ExitOutcome::Failure(failure) => {
                assert_eq!(failure.index, 1);
                assert_eq!(failure.directory, PathBuf::from("dirB"));
                assert_eq!(failure.phase, Some(Phase::Run));
                assert!(matches!(
                    failure.error,
                    Error::RunFailed { status: Some(1), ref command, .. } if command == "false"
                ));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_setup_failure_skips_run() {
        let cases = vec![case("dirA", &["false"], &["true"])];
        let mut executor = RecordingExecutor::default();

        let outcome = run_cases(&cases, &mut executor).await;

        assert_eq!(executor.programs(), ["false"]);
        assert_eq!(outcome.exit_code(), 1);
        match outcome {
            ExitOutcome::Failure(failure) => {
                assert_eq!(failure.phase, Some(Phase::Setup));
                assert!(matches!(failure.error, Error::SetupFailed { .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_directory_spawns_nothing() {
        let cases = vec![
            case("dirA", &["true"], &["true"]),
            case("gone", &["true"], &["true"]),
            case("dirC", &["true"], &["true"]),
        ];
        let mut executor = RecordingExecutor::default();
        executor.missing_dirs.insert(PathBuf::from("gone"));

        let outcome = run_cases(&cases, &mut executor).await;

        assert_eq!(executor.dirs(), ["dirA", "dirA"]);
        match outcome {
            ExitOutcome::Failure(failure) => {
                assert_eq!(failure.index, 1);
                assert_eq!(failure.phase, None);
                assert!(matches!(failure.error, Error::DirectoryNotFound { .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_spawn_error_is_failure() {
        let cases = vec![case("dirA", &["missing"], &["true"]), case("dirB", &[], &["true"])];
        let mut executor = RecordingExecutor::default();

        let outcome = run_cases(&cases, &mut executor).await;

        assert_eq!(executor.programs(), ["missing"]);
        match outcome {
            ExitOutcome::Failure(failure) => {
                assert_eq!(failure.phase, Some(Phase::Setup));
                assert!(matches!(failure.error, Error::SpawnError { .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_setup_is_skipped() {
        let cases = vec![case("dirA", &[], &["exit:0", "check.py"])];
        let mut executor = RecordingExecutor::default();

        let outcome = run_cases(&cases, &mut executor).await;

        assert!(outcome.is_success());
        assert_eq!(executor.programs(), ["exit:0"]);
    }

    #[tokio::test]
    async fn test_empty_run_command_fails_without_spawning() {
        let cases = vec![case("dirA", &["true"], &[])];
        let mut executor = RecordingExecutor::default();

        let outcome = run_cases(&cases, &mut executor).await;

        assert!(executor.calls.is_empty());
        assert!(matches!(
            outcome,
            ExitOutcome::Failure(Failure { error: Error::EmptyCommand { .. }, .. })
        ));
    }

    #[tokio::test]
    async fn test_repeated_runs_are_stable() {
        let cases = vec![case("dirA", &["true"], &["true"]), case("dirB", &["true"], &["true"])];
        for _ in 0..3 {
            let mut executor = RecordingExecutor::default();
            assert!(run_cases(&cases, &mut executor).await.is_success());
            assert_eq!(executor.calls.len(), 4);
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_code_is_reported() {
        let cases = vec![case("dirA", &["exit:3"], &["true"])];
        let mut executor = RecordingExecutor::default();

        match run_cases(&cases, &mut executor).await {
            ExitOutcome::Failure(failure) => {
                assert!(matches!(failure.error, Error::SetupFailed { status: Some(3), .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_interrupt_stops_the_run() {
        let cases = vec![
            case("dirA", &["true"], &["interrupt", "sleep 30"]),
            case("dirB", &["true"], &["true"]),
        ];
        let mut executor = RecordingExecutor::default();

        let outcome = run_cases(&cases, &mut executor).await;

        assert_eq!(executor.dirs(), ["dirA", "dirA"]);
        assert_eq!(outcome.exit_code(), 1);
        match outcome {
            ExitOutcome::Failure(failure) => {
                assert_eq!(failure.index, 0);
                assert_eq!(failure.phase, Some(Phase::Run));
                assert!(matches!(failure.error, Error::Interrupted { .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
