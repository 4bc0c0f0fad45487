//! Error types for engine operations

use thiserror::Error;

/// Errors that make the current snapshot state untrustworthy
///
/// Any of these aborts the run before a mutating command is issued.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The listing command could not be run
    #[error("Snapshot listing could not be run: {0}")]
    Command(String),

    /// The listing command exited with a non-zero status
    #[error("Snapshot listing exited with status {status}: {detail}")]
    ExitStatus {
        /// Exit status
        status: i32,
        /// Last output line
        detail: String,
    },

    /// The first output line is not the expected column header
    #[error("Snapshot listing has no header (expected '{expected}', found {found:?})")]
    MissingHeader {
        /// Expected header columns
        expected: String,
        /// First line actually received
        found: Option<String>,
    },
}

/// Fatal errors that abort a run
#[derive(Error, Debug)]
pub enum EngineError {
    /// The snapshot inventory could not be loaded
    #[error("Inventory load failed: {0}")]
    Inventory(#[from] InventoryError),
}
