//! CLI command dispatch
//!
//! Loads configuration and the selected suite, then hands the resolved
//! case list to the harness.

use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use crate::commands::{Commands, RunArgs, SuiteArgs};
use crate::common::config::Config;
use crate::common::{render_command, Result};
use crate::harness::{self, ExitOutcome, ProcessExecutor, Suite};

/// Dispatch a CLI command, returning the process exit code
///
/// No subcommand means `run` with default options.
pub async fn dispatch(command: Option<Commands>) -> Result<i32> {
    let config = Config::load()?;

    match command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(&config, args).await,
        Commands::List { suite, root, json } => list(&config, &suite, root.as_deref(), json),
        Commands::Check { suite, root } => check(&config, &suite, root.as_deref()),
    }
}

/// Pick the suite: `--suite` beats the config file beats the built-in one
fn load_suite(config: &Config, args: &SuiteArgs) -> Result<Suite> {
    match args.suite.as_ref().or(config.defaults.suite.as_ref()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading suite file");
            Suite::load(path)
        }
        None => Suite::builtin(),
    }
}

async fn run(config: &Config, args: RunArgs) -> Result<i32> {
    let suite = load_suite(config, &args.suite)?;
    let cases = suite.resolve(args.root.as_deref());

    let timeout = match args.timeout {
        Some(secs) => (secs > 0).then_some(secs),
        None => config.timeouts.command(),
    };
    let mut executor = ProcessExecutor::new()
        .with_timeout(timeout.map(Duration::from_secs))
        .quiet(args.quiet || config.defaults.quiet);

    println!(
        "{} {}",
        "Running Suite:".blue().bold(),
        suite.name.white().bold()
    );
    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }

    let outcome = harness::run_cases(&cases, &mut executor).await;
    if let ExitOutcome::Failure(failure) = &outcome {
        let phase = failure.phase.map_or_else(|| "precheck".to_string(), |p| p.to_string());
        eprintln!(
            "{} case {} of {} ({}) failed during {}: {}",
            "error:".red().bold(),
            failure.index + 1,
            cases.len(),
            failure.directory.display(),
            phase,
            failure.error
        );
    }

    Ok(outcome.exit_code())
}

fn list(config: &Config, args: &SuiteArgs, root: Option<&Path>, json: bool) -> Result<i32> {
    let suite = load_suite(config, args)?;
    let cases = suite.resolve(root);

    if json {
        println!("{}", serde_json::to_string_pretty(&cases)?);
        return Ok(0);
    }

    println!("{} ({} cases)", suite.name.bold(), cases.len());
    for (i, case) in cases.iter().enumerate() {
        println!("  {}. {}", i + 1, case.working_directory.display());
        if !case.setup_command.is_empty() {
            println!("       setup: {}", render_command(&case.setup_command).dimmed());
        }
        println!("       run:   {}", render_command(&case.run_command).dimmed());
    }
    Ok(0)
}

fn check(config: &Config, args: &SuiteArgs, root: Option<&Path>) -> Result<i32> {
    let suite = load_suite(config, args)?;
    let cases = suite.resolve(root);
    let issues = harness::check_cases(&cases);

    if issues.is_empty() {
        println!("{} {} case(s) ready", "✓".green(), cases.len());
        return Ok(0);
    }

    for issue in &issues {
        println!("{} {}", "✗".red(), issue);
    }
    println!("\n{} issue(s) found", issues.len());
    Ok(1)
}
