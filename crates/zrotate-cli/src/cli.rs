//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zrotate_engine::EngineConfig;

/// zrotate - Tiered ZFS snapshot rotation and pool scrubbing.
#[derive(Debug, Parser)]
#[command(name = "zrotate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ZROTATE_CONFIG", default_value = "zrotate.toml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (snapshot names only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prune, create and scrub (default)
    Run(RunArgs),

    /// Validate the configuration and show datasets, tiers and pools
    Check,

    /// Show tier histories and what a run would do now, without changing anything
    Status,
}

impl Command {
    /// The command to run when none is given.
    pub fn default_command() -> Self {
        Command::Run(RunArgs::default())
    }
}

/// Arguments for the run command.
#[derive(Debug, Clone, Default, Parser)]
pub struct RunArgs {
    /// Log the commands that would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Append a plain-text log of the run to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Hold an exclusive lock on this file while running
    #[arg(long)]
    pub lock_file: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay the flags on the configured settings.
    pub fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        if let Some(path) = &self.lock_file {
            config.lock_file = Some(path.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["zrotate"]).unwrap();
        assert_eq!(cli.format, CliFormat::Table);
        assert!(!cli.no_color);
        assert_eq!(cli.verbose, 0);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "zrotate",
            "-c",
            "/etc/zrotate.toml",
            "run",
            "--dry-run",
            "--lock-file",
            "/var/run/zrotate.lock",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/zrotate.toml"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Run(args)) => {
                assert!(args.dry_run);
                assert_eq!(args.lock_file, Some(PathBuf::from("/var/run/zrotate.lock")));
                assert!(args.log_file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["zrotate", "status", "--format", "json"]).unwrap();
        assert_eq!(cli.format, CliFormat::Json);
        assert!(matches!(cli.command, Some(Command::Status)));
    }

    #[test]
    fn test_unknown_flag_is_a_usage_error() {
        let err = Cli::try_parse_from(["zrotate", "run", "--bogus"]).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
    }

    #[test]
    fn test_flags_override_settings() {
        let args = RunArgs {
            dry_run: true,
            log_file: Some(PathBuf::from("/tmp/zrotate.log")),
            lock_file: None,
        };
        let settings = EngineConfig {
            lock_file: Some(PathBuf::from("/var/run/zrotate.lock")),
            ..EngineConfig::default()
        };

        let merged = args.apply(settings);
        assert!(merged.dry_run);
        assert_eq!(merged.log_file, Some(PathBuf::from("/tmp/zrotate.log")));
        assert_eq!(merged.lock_file, Some(PathBuf::from("/var/run/zrotate.lock")));
    }
}
