//! Status command implementation.

use crate::error::Result;
use crate::output::Formatter;
use chrono::Local;
use zrotate_domain::Topology;
use zrotate_engine::{Engine, EngineConfig, RunReport};
use zrotate_exec::SystemExecutor;

/// Execute the status command.
///
/// Shows the tier histories as of now and what a run would do, without
/// issuing any create, destroy or scrub. The run lock is not taken.
pub fn execute_status(config: EngineConfig, topology: &Topology, formatter: &Formatter) -> Result<RunReport> {
    let config = EngineConfig {
        dry_run: true,
        ..config
    };

    let executor = SystemExecutor::new(&config.zfs_binary, &config.zpool_binary, config.command_timeout)?;
    let engine = Engine::new(config, executor);

    // One listing feeds both the histories shown and the plan
    let outcome = engine.run_detailed_at(topology, &Local::now())?;

    let output = formatter.format_status(topology, &outcome.histories, &outcome.report)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(outcome.report)
}
