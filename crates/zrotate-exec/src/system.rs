//! `zfs` / `zpool` executor backed by child processes

use crate::error::ExecError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::{Builder, Runtime};
use zrotate_domain::args::{self, command_line};
use zrotate_domain::{CommandOutput, ZfsExecutor};

/// Runs the real `zfs` and `zpool` binaries
///
/// Calls block the caller. Each one is bounded by the configured timeout;
/// a process still running when it expires is killed.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use zrotate_domain::ZfsExecutor;
/// use zrotate_exec::SystemExecutor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = SystemExecutor::new("/sbin/zfs", "/sbin/zpool", Duration::from_secs(600))?;
/// let listing = executor.list_snapshots()?;
/// println!("{} lines", listing.lines.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SystemExecutor {
    zfs: PathBuf,
    zpool: PathBuf,
    timeout: Duration,
    runtime: Runtime,
}

impl SystemExecutor {
    /// Create an executor for the given binaries
    pub fn new(zfs: impl Into<PathBuf>, zpool: impl Into<PathBuf>, timeout: Duration) -> Result<Self, ExecError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ExecError::Runtime)?;

        Ok(Self {
            zfs: zfs.into(),
            zpool: zpool.into(),
            timeout,
            runtime,
        })
    }

    /// Path of the `zfs` binary
    pub fn zfs_binary(&self) -> &Path {
        &self.zfs
    }

    /// Path of the `zpool` binary
    pub fn zpool_binary(&self) -> &Path {
        &self.zpool
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program` with `args` and collect its status and output
    ///
    /// Output is stdout lines followed by stderr lines. A process killed by
    /// a signal reports status `-1`.
    pub fn run<S: AsRef<str>>(&self, program: &Path, args: &[S]) -> Result<CommandOutput, ExecError> {
        let command_line = command_line(program, args);
        tracing::debug!(command = %command_line, "Running command");

        let output = self
            .runtime
            .block_on(run_with_timeout(program, args, self.timeout, &command_line))?;

        tracing::debug!(
            command = %command_line,
            status = output.status,
            lines = output.lines.len(),
            "Command finished"
        );

        Ok(output)
    }
}

async fn run_with_timeout<S: AsRef<str>>(
    program: &Path,
    args: &[S],
    timeout: Duration,
    command_line: &str,
) -> Result<CommandOutput, ExecError> {
    let mut command = Command::new(program);
    command
        .args(args.iter().map(<S as AsRef<str>>::as_ref))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let spawn_error = |source: std::io::Error| ExecError::Spawn {
        command: command_line.to_string(),
        source,
    };

    let child = command.spawn().map_err(spawn_error)?;

    // Dropping the pending wait on timeout kills the child
    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| ExecError::Timeout {
            command: command_line.to_string(),
            timeout,
        })?
        .map_err(spawn_error)?;

    let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect();
    lines.extend(String::from_utf8_lossy(&output.stderr).lines().map(str::to_string));

    Ok(CommandOutput::new(output.status.code().unwrap_or(-1), lines))
}

impl ZfsExecutor for SystemExecutor {
    type Error = ExecError;

    fn list_snapshots(&self) -> Result<CommandOutput, ExecError> {
        self.run(&self.zfs, &args::list_snapshots())
    }

    fn create_snapshot(&self, target: &str, recursive: bool) -> Result<CommandOutput, ExecError> {
        self.run(&self.zfs, &args::create_snapshot(target, recursive))
    }

    fn destroy_snapshot(&self, target: &str, recursive: bool) -> Result<CommandOutput, ExecError> {
        self.run(&self.zfs, &args::destroy_snapshot(target, recursive))
    }

    fn scrub_start(&self, pool: &str) -> Result<CommandOutput, ExecError> {
        self.run(&self.zpool, &args::scrub_start(pool))
    }

    fn scrub_status(&self, pool: &str) -> Result<CommandOutput, ExecError> {
        self.run(&self.zpool, &args::scrub_status(pool))
    }
}
