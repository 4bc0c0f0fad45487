//! Configuration for engine runs
//!
//! Every recognised run option lives here and is handed to the engine (and
//! the command executor) at construction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use zrotate_domain::args;

/// Configuration for a zrotate run
///
/// # Examples
///
/// ```
/// use zrotate_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(!config.dry_run);
///
/// // Report every command instead of running it
/// let config = EngineConfig::dry_run();
/// assert!(config.dry_run);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the `zfs` binary
    /// Default: /sbin/zfs
    #[serde(default = "default_zfs_binary")]
    pub zfs_binary: PathBuf,

    /// Path to the `zpool` binary
    /// Default: /sbin/zpool
    #[serde(default = "default_zpool_binary")]
    pub zpool_binary: PathBuf,

    /// Upper bound on any single command invocation
    /// Default: 10 minutes
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    /// Dry-run mode: log the commands that would run without running them
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Append a plain-text log of the run to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Hold an exclusive lock on this file for the duration of the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,
}

fn default_zfs_binary() -> PathBuf {
    PathBuf::from("/sbin/zfs")
}

fn default_zpool_binary() -> PathBuf {
    PathBuf::from("/sbin/zpool")
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(10 * 60)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zfs_binary: default_zfs_binary(),
            zpool_binary: default_zpool_binary(),
            command_timeout: default_command_timeout(),
            dry_run: false,
            log_file: None,
            lock_file: None,
        }
    }
}

impl EngineConfig {
    /// Default configuration with dry-run enabled
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Render the command line a `zfs` call would use
    pub fn zfs_command_line<S: AsRef<str>>(&self, argv: &[S]) -> String {
        args::command_line(&self.zfs_binary, argv)
    }

    /// Render the command line a `zpool` call would use
    pub fn zpool_command_line<S: AsRef<str>>(&self, argv: &[S]) -> String {
        args::command_line(&self.zpool_binary, argv)
    }
}
