//! Snapshot inventory
//!
//! Turns the output of `zfs list -t snapshot` into raw `dataset@tag` records
//! grouped by dataset. The inventory is the only view of current state a run
//! has, so a listing without its header is rejected outright.

use crate::error::InventoryError;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use zrotate_domain::ZfsExecutor;

/// Column header expected on the first line of the listing
pub const LIST_HEADER: [&str; 5] = ["NAME", "USED", "AVAIL", "REFER", "MOUNTPOINT"];

/// What `zfs list` prints instead of a header when no snapshot exists
pub const EMPTY_LISTING: &str = "no datasets available";

/// A listed snapshot before it is matched to a tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSnapshot {
    /// Dataset name
    pub dataset: String,

    /// Name portion after `@`
    pub tag: String,
}

/// Raw snapshot records of the configured datasets
#[derive(Debug, Clone, Default)]
pub struct SnapshotInventory {
    by_dataset: HashMap<String, Vec<RawSnapshot>>,
    discarded: usize,
}

impl SnapshotInventory {
    /// Run the listing command and parse its output
    pub fn load<E>(executor: &E, known: &HashSet<&str>) -> Result<Self, InventoryError>
    where
        E: ZfsExecutor,
        E::Error: Display,
    {
        let output = executor
            .list_snapshots()
            .map_err(|e| InventoryError::Command(e.to_string()))?;

        if !output.success() {
            return Err(InventoryError::ExitStatus {
                status: output.status,
                detail: output.last_line().unwrap_or("no output").to_string(),
            });
        }

        Self::parse(&output.lines, known)
    }

    /// Parse listing lines, keeping only datasets in `known`
    ///
    /// Lines of other datasets, and lines that are not `dataset@tag ...`, are
    /// dropped without error.
    pub fn parse<S: AsRef<str>>(lines: &[S], known: &HashSet<&str>) -> Result<Self, InventoryError> {
        let mut lines = lines.iter().map(<S as AsRef<str>>::as_ref);

        match lines.next() {
            Some(first) if is_header(first) => {}
            Some(first) if first.trim() == EMPTY_LISTING => return Ok(Self::default()),
            first => {
                return Err(InventoryError::MissingHeader {
                    expected: LIST_HEADER.join(" "),
                    found: first.map(str::to_string),
                })
            }
        }

        let mut inventory = Self::default();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }

            let Some(raw) = parse_line(line) else {
                tracing::debug!(line, "Ignoring unrecognised listing line");
                inventory.discarded += 1;
                continue;
            };

            if !known.contains(raw.dataset.as_str()) {
                inventory.discarded += 1;
                continue;
            }

            inventory
                .by_dataset
                .entry(raw.dataset.clone())
                .or_default()
                .push(raw);
        }

        tracing::debug!(
            snapshots = inventory.len(),
            discarded = inventory.discarded,
            "Snapshot inventory loaded"
        );

        Ok(inventory)
    }

    /// Snapshots of a dataset, in listing order
    pub fn snapshots(&self, dataset: &str) -> &[RawSnapshot] {
        self.by_dataset
            .get(dataset)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of retained records
    pub fn len(&self) -> usize {
        self.by_dataset.values().map(Vec::len).sum()
    }

    /// Whether no record was retained
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines dropped (unknown dataset or unrecognised)
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

fn is_header(line: &str) -> bool {
    line.split_whitespace().eq(LIST_HEADER.iter().copied())
}

/// Split `dataset@tag   USED AVAIL ...` into its dataset and tag
fn parse_line(line: &str) -> Option<RawSnapshot> {
    let (dataset, rest) = line.split_once('@')?;
    let dataset = dataset.trim();
    let tag = rest.split_whitespace().next()?;

    if dataset.is_empty() || rest.starts_with(char::is_whitespace) {
        return None;
    }

    Some(RawSnapshot {
        dataset: dataset.to_string(),
        tag: tag.to_string(),
    })
}
