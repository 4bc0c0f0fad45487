//! Run report
//!
//! What a run did, what it skipped, and which commands failed.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of command an operation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `zfs snapshot`
    Create,
    /// `zfs destroy`
    Destroy,
    /// `zpool scrub`
    ScrubStart,
    /// `zpool status`
    ScrubStatus,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Destroy => "destroy",
            Operation::ScrubStart => "scrub start",
            Operation::ScrubStatus => "scrub status",
        };
        f.write_str(name)
    }
}

/// A command that failed or could not be run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationFailure {
    /// What was attempted
    pub operation: Operation,

    /// Snapshot name or pool the command targeted
    pub target: String,

    /// Exit status and last output line, or the executor error
    pub reason: String,
}

/// Results of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Snapshots created (or that would be, in dry-run)
    pub created: Vec<String>,

    /// Snapshots destroyed (or that would be, in dry-run)
    pub destroyed: Vec<String>,

    /// Pools a scrub was started on
    pub scrubs_started: Vec<String>,

    /// Pools skipped because a scrub was already running
    pub scrubs_running: Vec<String>,

    /// Snapshots created per tier
    pub created_by_tier: BTreeMap<String, usize>,

    /// Snapshots destroyed per tier
    pub destroyed_by_tier: BTreeMap<String, usize>,

    /// Commands that failed
    pub failures: Vec<OperationFailure>,

    /// Schedules that could not be evaluated (treated as not matching)
    pub schedule_errors: Vec<String>,

    /// Whether commands were only logged
    pub dry_run: bool,

    /// Wall-clock duration of the run in milliseconds
    pub runtime_ms: u64,
}

impl RunReport {
    /// Create an empty report
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Record a created snapshot
    pub fn record_created(&mut self, tier: &str, snapshot: String) {
        *self.created_by_tier.entry(tier.to_string()).or_insert(0) += 1;
        self.created.push(snapshot);
    }

    /// Record a destroyed snapshot
    pub fn record_destroyed(&mut self, tier: &str, snapshot: String) {
        *self.destroyed_by_tier.entry(tier.to_string()).or_insert(0) += 1;
        self.destroyed.push(snapshot);
    }

    /// Record a started scrub
    pub fn record_scrub_started(&mut self, pool: &str) {
        self.scrubs_started.push(pool.to_string());
    }

    /// Record a pool skipped because it is already scrubbing
    pub fn record_scrub_running(&mut self, pool: &str) {
        self.scrubs_running.push(pool.to_string());
    }

    /// Record a failed command
    pub fn record_failure(&mut self, operation: Operation, target: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(OperationFailure {
            operation,
            target: target.into(),
            reason: reason.into(),
        });
    }

    /// Record a schedule that could not be evaluated
    pub fn record_schedule_error(&mut self, message: impl Into<String>) {
        self.schedule_errors.push(message.into());
    }

    /// Whether any command failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Total snapshots created
    pub fn total_created(&self) -> usize {
        self.created.len()
    }

    /// Total snapshots destroyed
    pub fn total_destroyed(&self) -> usize {
        self.destroyed.len()
    }

    /// Generate a summary of the run
    pub fn summary(&self) -> String {
        let title = if self.dry_run {
            "zrotate Run Summary (dry run)"
        } else {
            "zrotate Run Summary"
        };
        let mut lines = vec![
            title.to_string(),
            "=".repeat(title.len()),
            format!("Runtime: {}ms", self.runtime_ms),
            format!("Created: {}", self.total_created()),
            format!("Destroyed: {}", self.total_destroyed()),
            format!("Scrubs started: {}", self.scrubs_started.len()),
            format!("Scrubs already running: {}", self.scrubs_running.len()),
        ];

        if !self.created_by_tier.is_empty() {
            lines.push(String::new());
            lines.push("Created by tier:".to_string());
            for (tier, count) in &self.created_by_tier {
                lines.push(format!("  {}: {}", tier, count));
            }
        }

        if !self.destroyed_by_tier.is_empty() {
            lines.push(String::new());
            lines.push("Destroyed by tier:".to_string());
            for (tier, count) in &self.destroyed_by_tier {
                lines.push(format!("  {}: {}", tier, count));
            }
        }

        if !self.schedule_errors.is_empty() {
            lines.push(String::new());
            lines.push("Schedule errors:".to_string());
            for message in &self.schedule_errors {
                lines.push(format!("  {}", message));
            }
        }

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push(format!("Failures: {}", self.failures.len()));
            for failure in &self.failures {
                lines.push(format!("  {} {}: {}", failure.operation, failure.target, failure.reason));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = RunReport::new(false);
        assert_eq!(report.total_created(), 0);
        assert_eq!(report.total_destroyed(), 0);
        assert!(!report.has_failures());
        assert!(!report.dry_run);
    }

    #[test]
    fn test_per_tier_counters() {
        let mut report = RunReport::new(false);
        report.record_created("hourly", "tank/home@hourly-2024-01-01_10_00_00".to_string());
        report.record_created("daily", "tank/home@daily-2024-01-01".to_string());
        report.record_created("hourly", "tank/media@hourly-2024-01-01_10_00_00".to_string());
        report.record_destroyed("daily", "tank/home@daily-2023-12-01".to_string());

        assert_eq!(report.created_by_tier["hourly"], 2);
        assert_eq!(report.created_by_tier["daily"], 1);
        assert_eq!(report.total_created(), 3);
        assert_eq!(report.destroyed_by_tier["daily"], 1);
        assert_eq!(report.total_destroyed(), 1);
    }

    #[test]
    fn test_failures() {
        let mut report = RunReport::new(false);
        report.record_failure(Operation::Destroy, "tank/home@daily-2024-01-01", "exit status 1: dataset is busy");

        assert!(report.has_failures());
        assert_eq!(report.failures[0].operation, Operation::Destroy);
    }

    #[test]
    fn test_summary() {
        let mut report = RunReport::new(true);
        report.record_created("hourly", "tank/home@hourly-2024-01-01_10_00_00".to_string());
        report.record_scrub_started("tank");
        report.record_scrub_running("backup");
        report.record_failure(Operation::ScrubStart, "tank", "exit status 1");
        report.record_schedule_error("tier weekly: '25:00' does not match '%H:%M'");
        report.runtime_ms = 42;

        let summary = report.summary();
        assert!(summary.contains("(dry run)"));
        assert!(summary.contains("Runtime: 42ms"));
        assert!(summary.contains("  hourly: 1"));
        assert!(summary.contains("Scrubs started: 1"));
        assert!(summary.contains("Scrubs already running: 1"));
        assert!(summary.contains("scrub start tank: exit status 1"));
        assert!(summary.contains("tier weekly"));
    }

    #[test]
    fn test_serializes_operation_names() {
        let mut report = RunReport::new(false);
        report.record_failure(Operation::ScrubStatus, "tank", "timed out");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failures"][0]["operation"], "scrub_status");
        assert_eq!(json["dry_run"], false);
    }
}
