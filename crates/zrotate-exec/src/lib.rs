//! zrotate Exec
//!
//! The production [`ZfsExecutor`](zrotate_domain::ZfsExecutor): runs the
//! `zfs` and `zpool` binaries as child processes with a per-call timeout.
//!
//! The engine is synchronous, so [`SystemExecutor`] owns a current-thread
//! tokio runtime and blocks on each child. A timed-out child is killed.

#![warn(missing_docs)]

mod error;
mod system;

pub use error::ExecError;
pub use system::SystemExecutor;
