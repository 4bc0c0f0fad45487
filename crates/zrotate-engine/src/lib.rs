//! zrotate Engine
//!
//! Retention and scrub decisions for tiered ZFS snapshots.
//!
//! # Overview
//!
//! Each run is stateless and runs to completion:
//!
//! 1. **Inventory**: list every snapshot and keep those of configured datasets
//! 2. **Resolve**: match tags against each tier's naming pattern into
//!    timestamp-ordered histories
//! 3. **Prune**: destroy the oldest snapshots of any history above its
//!    keep-count (every run, regardless of schedules)
//! 4. **Create**: for tiers whose schedule matches now, snapshot every dataset
//!    whose interval has elapsed
//! 5. **Scrub**: for pools whose schedule matches now, start a scrub unless
//!    one is running
//!
//! A failed inventory load aborts the run before any command is issued.
//! Failed create, destroy and scrub commands are collected in the
//! [`RunReport`] and the run carries on.
//!
//! # Usage
//!
//! ```
//! use zrotate_domain::{CommandOutput, Dataset, NamingPattern, Schedule, Tier, Topology, ZfsExecutor};
//! use zrotate_engine::{Engine, EngineConfig};
//! use chrono::{TimeZone, Utc};
//! use std::time::Duration;
//!
//! struct Listing;
//!
//! impl ZfsExecutor for Listing {
//!     type Error = String;
//!
//!     fn list_snapshots(&self) -> Result<CommandOutput, String> {
//!         Ok(CommandOutput::ok(["NAME USED AVAIL REFER MOUNTPOINT"]))
//!     }
//!     fn create_snapshot(&self, _: &str, _: bool) -> Result<CommandOutput, String> {
//!         Ok(CommandOutput::ok(Vec::<String>::new()))
//!     }
//!     fn destroy_snapshot(&self, _: &str, _: bool) -> Result<CommandOutput, String> {
//!         Ok(CommandOutput::ok(Vec::<String>::new()))
//!     }
//!     fn scrub_start(&self, _: &str) -> Result<CommandOutput, String> {
//!         Ok(CommandOutput::ok(Vec::<String>::new()))
//!     }
//!     fn scrub_status(&self, _: &str) -> Result<CommandOutput, String> {
//!         Ok(CommandOutput::ok(Vec::<String>::new()))
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tier = Tier {
//!     name: "daily".to_string(),
//!     schedule: Schedule::new("%H:%M", "00:00")?,
//!     keep: 7,
//!     interval: Duration::from_secs(23 * 3600),
//!     naming: NamingPattern::new("daily-%Y-%m-%d")?,
//!     datasets: vec!["home".to_string()],
//! };
//! let topology = Topology::new(vec![Dataset::new("home", "tank/home", false)], vec![], vec![tier])?;
//!
//! let engine = Engine::new(EngineConfig::dry_run(), Listing);
//! let report = engine.run_at(&topology, &Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap())?;
//!
//! assert_eq!(report.created, vec!["tank/home@daily-2024-01-08"]);
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! zfs_binary = "/sbin/zfs"
//! zpool_binary = "/sbin/zpool"
//! command_timeout = "10m"
//! dry_run = false
//! log_file = "/var/log/zrotate.log"
//! lock_file = "/var/run/zrotate.lock"
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
pub mod inventory;
mod report;
pub mod resolver;
pub mod retention;
pub mod scrub;

pub use config::EngineConfig;
pub use engine::{Engine, RunOutcome};
pub use error::{EngineError, InventoryError};
pub use inventory::{RawSnapshot, SnapshotInventory};
pub use report::{Operation, OperationFailure, RunReport};
pub use resolver::TierHistories;
pub use retention::{CreateDecision, PrunePlan};
pub use scrub::ScrubDecision;
