//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit status of a fully successful run.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status of a fatal error (configuration, inventory, lock).
pub const EXIT_FATAL: i32 = 1;

/// Exit status clap uses for usage errors.
pub const EXIT_USAGE: i32 = 2;

/// Exit status of a completed run in which some commands failed.
pub const EXIT_PARTIAL: i32 = 3;

/// CLI-specific errors.
///
/// All of them are fatal: they stop the invocation before, or instead of,
/// a run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inconsistent datasets, pools or tiers
    #[error("Topology error: {0}")]
    Topology(#[from] zrotate_domain::TopologyError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Run aborted by the engine
    #[error("{0}")]
    Engine(#[from] zrotate_engine::EngineError),

    /// Command executor could not be set up
    #[error("Executor error: {0}")]
    Exec(#[from] zrotate_exec::ExecError),

    /// Run lock is held or unusable
    #[error("Lock error: {0}")]
    Lock(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        EXIT_FATAL
    }
}
