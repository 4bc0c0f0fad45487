//! zrotate Domain Layer
//!
//! This crate contains the domain model for zrotate: the storage topology a run
//! operates on, the calendar rules used to name and date snapshots, and the
//! trait through which the engine talks to the storage tools.
//!
//! ## Key Concepts
//!
//! - **Dataset**: a named unit of the storage hierarchy that can be snapshotted
//! - **Pool**: a storage pool with a scrub schedule
//! - **Tier**: a retention policy (hourly, daily, ...) with its own schedule,
//!   keep-count, interval and naming pattern
//! - **Snapshot**: a `dataset@tag` record resolved to a Unix timestamp
//! - **Tier History**: the ascending, per (tier, dataset) list of snapshots
//!
//! ## Architecture
//!
//! - The only external dependency is `chrono`, for calendar arithmetic
//! - Pure model and calendar logic only
//! - Command execution lives behind [`traits::ZfsExecutor`]; the argument
//!   lists it runs are built in [`args`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod args;
pub mod calendar;
pub mod dataset;
pub mod naming;
pub mod schedule;
pub mod snapshot;
pub mod tier;
pub mod topology;
pub mod traits;

// Re-exports for convenience
pub use calendar::{CalendarError, CalendarFields, WeekNumbering};
pub use dataset::{Dataset, Pool};
pub use naming::{NamingPattern, Resolution};
pub use schedule::Schedule;
pub use snapshot::{Snapshot, TierHistory};
pub use tier::{Tier, TierPolicy};
pub use topology::{Topology, TopologyError};
pub use traits::{CommandOutput, ZfsExecutor};
