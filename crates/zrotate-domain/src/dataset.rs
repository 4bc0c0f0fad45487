//! Datasets and pools

use crate::schedule::Schedule;

/// A snapshottable unit of the storage hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Identifier tiers use to reference this dataset
    pub id: String,

    /// Storage path, e.g. `tank/home`
    pub name: String,

    /// Whether snapshot and destroy cascade to child datasets
    pub recursive: bool,
}

impl Dataset {
    /// Create a new dataset
    pub fn new(id: impl Into<String>, name: impl Into<String>, recursive: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            recursive,
        }
    }

    /// Full `dataset@tag` name of one of this dataset's snapshots
    pub fn snapshot_name(&self, tag: &str) -> String {
        format!("{}@{}", self.name, tag)
    }
}

/// A storage pool and its scrub schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    /// Pool name
    pub name: String,

    /// When a scrub should be started
    pub scrub: Schedule,
}

impl Pool {
    /// Create a new pool
    pub fn new(name: impl Into<String>, scrub: Schedule) -> Self {
        Self {
            name: name.into(),
            scrub,
        }
    }
}
