//! zrotate CLI library.
//!
//! This library provides the pieces of the `zrotate` binary: argument
//! parsing, configuration loading, logging setup, the run lock, command
//! execution and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod output;

pub use cli::{Cli, CliFormat, Command, RunArgs};
pub use config::ConfigFile;
pub use error::{CliError, Result, EXIT_FATAL, EXIT_PARTIAL, EXIT_SUCCESS, EXIT_USAGE};
pub use lock::RunLock;
pub use output::{Formatter, OutputFormat};
