//! Run orchestration
//!
//! One run is: load the inventory, resolve tier histories, prune, create,
//! then scrub. Only a failed inventory load aborts; every other failure is
//! recorded in the report and the run moves on.

use crate::inventory::SnapshotInventory;
use crate::report::{Operation, RunReport};
use crate::resolver::{self, TierHistories};
use crate::retention::{self, CreateDecision};
use crate::scrub::{self, ScrubDecision};
use crate::{EngineConfig, EngineError};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fmt::Display;
use std::time::Instant;
use zrotate_domain::args;
use zrotate_domain::{CommandOutput, Schedule, TierHistory, Topology, ZfsExecutor};

/// A run's starting point and result
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Tier histories as listed, before pruning
    pub histories: TierHistories,
    /// What the run did, or would do in dry-run mode
    pub report: RunReport,
}

/// Snapshot retention and scrub engine
///
/// Holds no state between runs: every run rebuilds its view of the world
/// from a fresh snapshot listing.
pub struct Engine<E> {
    config: EngineConfig,
    executor: E,
}

impl<E> Engine<E>
where
    E: ZfsExecutor,
    E::Error: Display,
{
    /// Create a new engine
    pub fn new(config: EngineConfig, executor: E) -> Self {
        Self { config, executor }
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The command executor
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run once against the current local time
    pub fn run(&self, topology: &Topology) -> Result<RunReport, EngineError> {
        self.run_at(topology, &Local::now())
    }

    /// Run once as if the current time were `now`
    ///
    /// Tags are named and schedules evaluated in `now`'s time zone.
    pub fn run_at<Tz: TimeZone>(&self, topology: &Topology, now: &DateTime<Tz>) -> Result<RunReport, EngineError> {
        self.run_detailed_at(topology, now).map(|outcome| outcome.report)
    }

    /// Like [`Engine::run_at`], also returning the histories the run started from
    pub fn run_detailed_at<Tz: TimeZone>(
        &self,
        topology: &Topology,
        now: &DateTime<Tz>,
    ) -> Result<RunOutcome, EngineError> {
        let started = Instant::now();
        let mut report = RunReport::new(self.config.dry_run);
        let now_local = now.naive_local();

        tracing::info!(
            at = %now_local,
            dry_run = self.config.dry_run,
            tiers = topology.tiers().len(),
            pools = topology.pools().len(),
            "Starting run"
        );

        let listed = self.histories_at(topology, &now.timezone())?;
        let mut histories = listed.clone();

        self.prune_pass(topology, &mut histories, &mut report);
        self.create_pass(topology, &histories, &now_local, now.timestamp(), &mut report);
        self.scrub_pass(topology, &now_local, &mut report);

        report.runtime_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            created = report.total_created(),
            destroyed = report.total_destroyed(),
            scrubs = report.scrubs_started.len(),
            failures = report.failures.len(),
            "Run complete"
        );

        Ok(RunOutcome {
            histories: listed,
            report,
        })
    }

    /// Load the inventory and resolve the tier histories
    ///
    /// Read-only; issues only the listing command.
    pub fn histories_at<Tz: TimeZone>(&self, topology: &Topology, tz: &Tz) -> Result<TierHistories, EngineError> {
        let inventory = SnapshotInventory::load(&self.executor, &topology.dataset_names())?;
        if inventory.discarded() > 0 {
            tracing::debug!(discarded = inventory.discarded(), "Listing lines outside the topology");
        }

        Ok(resolver::resolve(topology, &inventory, tz))
    }

    /// Destroy every snapshot beyond a tier's keep-count
    ///
    /// Runs regardless of schedules. The survivors replace the history even
    /// when a destroy fails.
    fn prune_pass(&self, topology: &Topology, histories: &mut TierHistories, report: &mut RunReport) {
        for tier in topology.tiers() {
            for dataset in topology.tier_datasets(tier) {
                let Some(history) = histories.get_mut(&tier.name, &dataset.name) else {
                    continue;
                };

                let plan = retention::plan_prune(history, tier.keep);
                if !plan.destroy.is_empty() {
                    tracing::info!(
                        tier = %tier.name,
                        dataset = %dataset.name,
                        count = history.len(),
                        keep = tier.keep,
                        "Pruning {} snapshot(s)",
                        plan.destroy.len()
                    );
                }

                for snapshot in &plan.destroy {
                    let target = snapshot.full_name();
                    let done = self.execute(
                        Operation::Destroy,
                        &target,
                        self.config.zfs_command_line(&args::destroy_snapshot(&target, dataset.recursive)),
                        |executor| executor.destroy_snapshot(&target, dataset.recursive),
                        report,
                    );
                    if done {
                        report.record_destroyed(&tier.name, target);
                    }
                }

                *history = plan.survivors;
            }
        }
    }

    /// Create a snapshot for every due (tier, dataset) pair of a matching tier
    fn create_pass(
        &self,
        topology: &Topology,
        histories: &TierHistories,
        now_local: &NaiveDateTime,
        now_ts: i64,
        report: &mut RunReport,
    ) {
        let empty = TierHistory::new();

        for tier in topology.tiers() {
            if !schedule_matches(&tier.schedule, now_local, &format!("tier {}", tier.name), report) {
                continue;
            }

            for dataset in topology.tier_datasets(tier) {
                let history = histories.get(&tier.name, &dataset.name).unwrap_or(&empty);

                let decision = match retention::decide_create(history, tier, now_local, now_ts) {
                    Ok(decision) => decision,
                    Err(e) => {
                        tracing::error!(tier = %tier.name, dataset = %dataset.name, "Cannot name snapshot: {}", e);
                        report.record_failure(
                            Operation::Create,
                            dataset.snapshot_name(tier.naming.as_str()),
                            e.to_string(),
                        );
                        continue;
                    }
                };

                let tag = match &decision {
                    CreateDecision::Bootstrap { tag } | CreateDecision::Due { tag } => tag,
                    CreateDecision::OverRetained { count, keep } => {
                        tracing::warn!(
                            tier = %tier.name,
                            dataset = %dataset.name,
                            "Over retention ({} > {}), not creating",
                            count,
                            keep
                        );
                        continue;
                    }
                    skipped => {
                        tracing::debug!(tier = %tier.name, dataset = %dataset.name, decision = ?skipped, "Nothing to create");
                        continue;
                    }
                };

                let target = dataset.snapshot_name(tag);
                let done = self.execute(
                    Operation::Create,
                    &target,
                    self.config.zfs_command_line(&args::create_snapshot(&target, dataset.recursive)),
                    |executor| executor.create_snapshot(&target, dataset.recursive),
                    report,
                );
                if done {
                    report.record_created(&tier.name, target);
                }
            }
        }
    }

    /// Start a scrub on every pool whose schedule matches and that is idle
    fn scrub_pass(&self, topology: &Topology, now_local: &NaiveDateTime, report: &mut RunReport) {
        for pool in topology.pools() {
            if !schedule_matches(&pool.scrub, now_local, &format!("pool {}", pool.name), report) {
                continue;
            }

            // The status probe is read-only and also runs in dry-run mode
            let status = match self.executor.scrub_status(&pool.name) {
                Ok(output) if output.success() => output,
                Ok(output) => {
                    let reason = exit_reason(&output);
                    tracing::warn!(pool = %pool.name, "Scrub status failed: {}", reason);
                    report.record_failure(Operation::ScrubStatus, &pool.name, reason);
                    continue;
                }
                Err(e) => {
                    tracing::error!(pool = %pool.name, "Scrub status could not run: {}", e);
                    report.record_failure(Operation::ScrubStatus, &pool.name, e.to_string());
                    continue;
                }
            };

            match scrub::decide(&status) {
                ScrubDecision::AlreadyRunning => {
                    tracing::info!(pool = %pool.name, "Scrub already in progress, skipping");
                    report.record_scrub_running(&pool.name);
                }
                ScrubDecision::Start => {
                    let done = self.execute(
                        Operation::ScrubStart,
                        &pool.name,
                        self.config.zpool_command_line(&args::scrub_start(&pool.name)),
                        |executor| executor.scrub_start(&pool.name),
                        report,
                    );
                    if done {
                        report.record_scrub_started(&pool.name);
                    }
                }
            }
        }
    }

    /// Issue one mutating command, or only log it in dry-run mode
    ///
    /// Returns whether the command succeeded (always true in dry-run).
    fn execute<F>(
        &self,
        operation: Operation,
        target: &str,
        command_line: String,
        call: F,
        report: &mut RunReport,
    ) -> bool
    where
        F: FnOnce(&E) -> Result<CommandOutput, E::Error>,
    {
        if self.config.dry_run {
            tracing::info!("DRY RUN: would run {}", command_line);
            return true;
        }

        match call(&self.executor) {
            Ok(output) if output.success() => {
                tracing::info!(item = %target, "{} ok", operation);
                true
            }
            Ok(output) => {
                let reason = exit_reason(&output);
                tracing::warn!(item = %target, "{} failed: {}", operation, reason);
                report.record_failure(operation, target, reason);
                false
            }
            Err(e) => {
                tracing::error!(item = %target, "{} could not run: {}", operation, e);
                report.record_failure(operation, target, e.to_string());
                false
            }
        }
    }
}

/// Evaluate a schedule; an unparseable schedule counts as not matching
fn schedule_matches(schedule: &Schedule, now_local: &NaiveDateTime, owner: &str, report: &mut RunReport) -> bool {
    match schedule.matches(now_local) {
        Ok(matched) => {
            tracing::debug!(owner, format = schedule.format(), time = schedule.time(), matched, "Schedule evaluated");
            matched
        }
        Err(e) => {
            tracing::warn!(owner, "Schedule cannot be evaluated, skipping: {}", e);
            report.record_schedule_error(format!("{}: {}", owner, e));
            false
        }
    }
}

fn exit_reason(output: &CommandOutput) -> String {
    format!(
        "exit status {}: {}",
        output.status,
        output.last_line().unwrap_or("no output")
    )
}
