//! Error types for command execution

use std::time::Duration;
use thiserror::Error;

/// A command that could not be run to completion
///
/// A command that runs and exits non-zero is not an error here; its status
/// is returned in the output.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The process could not be started or its output not collected
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The process did not exit within the timeout and was killed
    #[error("'{command}' timed out after {timeout:?}")]
    Timeout {
        /// Command line
        command: String,
        /// Configured timeout
        timeout: Duration,
    },

    /// The runtime that drives child processes could not be built
    #[error("Process runtime error: {0}")]
    Runtime(#[source] std::io::Error),
}
