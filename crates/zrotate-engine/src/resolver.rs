//! Tier resolver
//!
//! Matches inventory tags against each tier's naming pattern and builds the
//! ascending per (tier, dataset) histories the retention passes consume.

use crate::inventory::SnapshotInventory;
use chrono::TimeZone;
use std::collections::{HashMap, HashSet};
use zrotate_domain::{Snapshot, TierHistory, Topology};

/// Tier histories keyed by tier name, then dataset name
#[derive(Debug, Clone, Default)]
pub struct TierHistories {
    histories: HashMap<String, HashMap<String, TierHistory>>,
}

impl TierHistories {
    /// Create an empty set of histories
    pub fn new() -> Self {
        Self::default()
    }

    /// History of a (tier, dataset) pair
    pub fn get(&self, tier: &str, dataset: &str) -> Option<&TierHistory> {
        self.histories.get(tier)?.get(dataset)
    }

    /// Mutable history of a (tier, dataset) pair
    pub fn get_mut(&mut self, tier: &str, dataset: &str) -> Option<&mut TierHistory> {
        self.histories.get_mut(tier)?.get_mut(dataset)
    }

    /// Replace the history of a (tier, dataset) pair
    pub fn insert(&mut self, tier: &str, dataset: &str, history: TierHistory) {
        self.histories
            .entry(tier.to_string())
            .or_default()
            .insert(dataset.to_string(), history);
    }

    /// Total number of resolved snapshots
    pub fn total(&self) -> usize {
        self.histories
            .values()
            .flat_map(HashMap::values)
            .map(TierHistory::len)
            .sum()
    }
}

/// Resolve inventory records into tier histories
///
/// Every (tier, assigned dataset) pair gets a history, possibly empty. Tags
/// that do not parse with a tier's pattern are skipped. A tag matching
/// several tiers belongs to the first in configuration order.
pub fn resolve<Tz: TimeZone>(topology: &Topology, inventory: &SnapshotInventory, tz: &Tz) -> TierHistories {
    let mut histories = TierHistories::new();
    let mut claimed: HashSet<(&str, &str)> = HashSet::new();

    for tier in topology.tiers() {
        for dataset in topology.tier_datasets(tier) {
            let mut history = TierHistory::new();

            for raw in inventory.snapshots(&dataset.name) {
                let key = (raw.dataset.as_str(), raw.tag.as_str());
                if claimed.contains(&key) {
                    continue;
                }

                match tier.naming.resolve(&raw.tag, tz) {
                    Ok(timestamp) => {
                        history.insert(Snapshot::new(&raw.dataset, &raw.tag, timestamp));
                        claimed.insert(key);
                    }
                    Err(e) => {
                        tracing::trace!(tier = %tier.name, tag = %raw.tag, "Tag not in tier: {}", e);
                    }
                }
            }

            tracing::debug!(
                tier = %tier.name,
                dataset = %dataset.name,
                count = history.len(),
                "Resolved tier history"
            );
            histories.insert(&tier.name, &dataset.name, history);
        }
    }

    histories
}
