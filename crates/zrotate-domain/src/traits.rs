//! Trait definitions for external interactions
//!
//! These traits define the boundary between the decision engine and the
//! storage tools. Implementations live in other crates (zrotate-exec) or in
//! tests.

/// Exit status and captured output of one command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit status (`-1` when terminated by a signal)
    pub status: i32,

    /// Captured output, one entry per line
    pub lines: Vec<String>,
}

impl CommandOutput {
    /// Create a new output record
    pub fn new(status: i32, lines: Vec<String>) -> Self {
        Self { status, lines }
    }

    /// Successful output with the given lines
    pub fn ok<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(0, lines.into_iter().map(Into::into).collect())
    }

    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Last non-empty output line, for error reporting
    pub fn last_line(&self) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
    }
}

/// Synchronous access to the `zfs` / `zpool` tools
///
/// Implementations are stateless: every call runs one command and returns
/// its status and output. A returned `Err` means the command could not be run
/// to completion (spawn failure, timeout); a non-zero exit is reported through
/// [`CommandOutput::status`].
pub trait ZfsExecutor {
    /// Error type for failed invocations
    type Error;

    /// List all snapshots (`zfs list -t snapshot`)
    fn list_snapshots(&self) -> Result<CommandOutput, Self::Error>;

    /// Create `dataset@tag` (`zfs snapshot [-r]`)
    fn create_snapshot(&self, target: &str, recursive: bool) -> Result<CommandOutput, Self::Error>;

    /// Destroy `dataset@tag` (`zfs destroy [-r]`)
    fn destroy_snapshot(&self, target: &str, recursive: bool) -> Result<CommandOutput, Self::Error>;

    /// Start a scrub (`zpool scrub`)
    fn scrub_start(&self, pool: &str) -> Result<CommandOutput, Self::Error>;

    /// Report pool status (`zpool status`)
    fn scrub_status(&self, pool: &str) -> Result<CommandOutput, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_helpers() {
        let output = CommandOutput::ok(["first", "second", "  "]);
        assert!(output.success());
        assert_eq!(output.last_line(), Some("second"));

        let failed = CommandOutput::new(1, vec![]);
        assert!(!failed.success());
        assert_eq!(failed.last_line(), None);
    }
}
