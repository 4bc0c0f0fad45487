//! Run command implementation.

use crate::error::{CliError, Result};
use crate::lock::RunLock;
use crate::output::Formatter;
use zrotate_domain::Topology;
use zrotate_engine::{Engine, EngineConfig, RunReport};
use zrotate_exec::SystemExecutor;

/// Execute the run command.
///
/// `config` already carries any command-line overrides. The run lock, when
/// configured, is held until the report has been printed.
pub fn execute_run(config: EngineConfig, topology: &Topology, formatter: &Formatter) -> Result<RunReport> {
    let _lock = match &config.lock_file {
        Some(path) => Some(RunLock::acquire(path).map_err(|e| CliError::Lock(format!("{:#}", e)))?),
        None => None,
    };

    let executor = SystemExecutor::new(&config.zfs_binary, &config.zpool_binary, config.command_timeout)?;
    let engine = Engine::new(config, executor);
    let report = engine.run(topology)?;

    for line in report.summary().lines() {
        tracing::info!("{}", line);
    }

    let output = formatter.format_report(&report)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(report)
}
