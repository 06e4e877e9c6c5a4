//! Command execution
//!
//! The runner only sees the [`CommandExecutor`] trait. [`ProcessExecutor`]
//! spawns real child processes; tests substitute a recorder.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::task::Poll;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::common::{render_command, Error, Result};

/// Exit status of a completed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, or `None` if the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        Self { code: status.code() }
    }
}

/// Executes one command to completion
#[async_trait]
pub trait CommandExecutor: Send {
    /// Run `argv` with `cwd` as its working directory and wait for it
    ///
    /// Returns the exit status of a command that ran. Commands that could
    /// not be launched, timed out, or were interrupted return an error.
    async fn execute(&mut self, cwd: &Path, argv: &[String]) -> Result<CommandStatus>;

    /// Whether a case's working directory exists
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Spawns commands as child processes
///
/// Must be created inside a tokio runtime: construction registers the
/// interrupt listeners used for every command it runs.
#[derive(Debug)]
pub struct ProcessExecutor {
    /// Kill a command that runs longer than this
    timeout: Option<Duration>,
    /// Discard child output instead of inheriting the terminal
    quiet: bool,
    interrupts: Interrupts,
}

enum Waited {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Interrupted,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self {
            timeout: None,
            quiet: false,
            interrupts: Interrupts::install(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn output(&self) -> Stdio {
        if self.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        }
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&mut self, cwd: &Path, argv: &[String]) -> Result<CommandStatus> {
        let (program, args) = argv.split_first().ok_or_else(|| Error::EmptyCommand {
            directory: cwd.to_path_buf(),
        })?;
        let rendered = render_command(argv);

        if self.interrupts.raised().await {
            tracing::warn!(command = %rendered, "Interrupt pending, not starting command");
            return Err(Error::Interrupted { command: rendered });
        }

        tracing::debug!(cwd = %cwd.display(), command = %rendered, "Spawning command");

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(self.output())
            .stderr(self.output())
            .kill_on_drop(true);
        // Own process group, so a kill reaches whatever the command spawned
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|e| Error::spawn_failed(cwd, &rendered, e))?;

        let timeout = self.timeout;
        let waited = tokio::select! {
            biased;
            () = self.interrupts.recv() => Waited::Interrupted,
            waited = wait_for(&mut child, timeout) => waited,
        };

        match waited {
            Waited::Exited(status) => {
                let status = status.map_err(|e| Error::spawn_failed(cwd, &rendered, e))?;
                tracing::debug!(command = %rendered, code = ?status.code(), "Command exited");
                Ok(status.into())
            }
            Waited::TimedOut => {
                kill_tree(&mut child).await;
                Err(Error::Timeout {
                    command: rendered,
                    secs: timeout.map(|t| t.as_secs()).unwrap_or_default(),
                })
            }
            Waited::Interrupted => {
                tracing::warn!(command = %rendered, "Interrupt received, killing child");
                kill_tree(&mut child).await;
                Err(Error::Interrupted { command: rendered })
            }
        }
    }
}

async fn wait_for(child: &mut Child, limit: Option<Duration>) -> Waited {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => Waited::Exited(status),
            Err(_) => Waited::TimedOut,
        },
        None => Waited::Exited(child.wait().await),
    }
}

/// Kill the child's process group, then the child itself, and reap it
async fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // The child leads its own group, so its pid is the group id
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }
    let _ = child.kill().await;
}

#[cfg(unix)]
type Listener = tokio::signal::unix::Signal;
#[cfg(windows)]
type Listener = tokio::signal::windows::CtrlC;

/// Operator interrupt listeners, registered once per executor
///
/// Ctrl-C everywhere, plus SIGTERM on Unix. A signal that arrives while
/// no child is running stays buffered in its listener and is seen by the
/// next check. Once seen, the interrupt stays raised.
#[derive(Debug)]
struct Interrupts {
    listeners: Vec<Listener>,
    raised: bool,
}

impl Interrupts {
    fn install() -> Self {
        let mut listeners = Vec::new();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            for kind in [SignalKind::interrupt(), SignalKind::terminate()] {
                match signal(kind) {
                    Ok(listener) => listeners.push(listener),
                    Err(e) => tracing::warn!(error = %e, "Failed to install signal handler"),
                }
            }
        }

        #[cfg(windows)]
        match tokio::signal::windows::ctrl_c() {
            Ok(listener) => listeners.push(listener),
            Err(e) => tracing::warn!(error = %e, "Failed to install Ctrl-C handler"),
        }

        Self {
            listeners,
            raised: false,
        }
    }

    /// Resolves once an interrupt has been received
    ///
    /// Never resolves if no listener could be installed.
    async fn recv(&mut self) {
        if self.raised {
            return;
        }
        let listeners = &mut self.listeners;
        std::future::poll_fn(|cx| {
            for listener in listeners.iter_mut() {
                if let Poll::Ready(Some(())) = listener.poll_recv(cx) {
                    return Poll::Ready(());
                }
            }
            Poll::Pending
        })
        .await;
        self.raised = true;
    }

    /// Whether an interrupt has arrived, without waiting for one
    async fn raised(&mut self) -> bool {
        tokio::select! {
            biased;
            () = self.recv() => true,
            () = std::future::ready(()) => false,
        }
    }
}
