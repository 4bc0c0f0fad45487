//! Snapshots and per-tier histories

/// A snapshot resolved to the moment it was taken
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot {
    /// Dataset name
    pub dataset: String,

    /// Name portion after the `@` separator
    pub tag: String,

    /// Unix time resolved from the tag
    pub timestamp: i64,
}

impl Snapshot {
    /// Create a new snapshot record
    pub fn new(dataset: impl Into<String>, tag: impl Into<String>, timestamp: i64) -> Self {
        Self {
            dataset: dataset.into(),
            tag: tag.into(),
            timestamp,
        }
    }

    /// Full `dataset@tag` name
    pub fn full_name(&self) -> String {
        format!("{}@{}", self.dataset, self.tag)
    }
}

/// Snapshots of one tier on one dataset, ascending by timestamp
///
/// Ties are broken by tag so the order is total. Tags are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierHistory {
    snapshots: Vec<Snapshot>,
}

impl TierHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from snapshots in any order
    ///
    /// Later duplicates of a tag are dropped.
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        let mut history = Self::new();
        for snapshot in snapshots {
            history.insert(snapshot);
        }
        history
    }

    /// Insert a snapshot at its sorted position
    ///
    /// Returns `false` (and leaves the history unchanged) if the tag is
    /// already present.
    pub fn insert(&mut self, snapshot: Snapshot) -> bool {
        if self.contains_tag(&snapshot.tag) {
            return false;
        }

        let at = self.snapshots.partition_point(|existing| {
            (existing.timestamp, existing.tag.as_str()) < (snapshot.timestamp, snapshot.tag.as_str())
        });
        self.snapshots.insert(at, snapshot);
        true
    }

    /// Number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Oldest snapshot
    pub fn oldest(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    /// Whether a snapshot with this tag is present
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.snapshots.iter().any(|s| s.tag == tag)
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    /// The snapshots as a slice, oldest first
    pub fn as_slice(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Remove and return the `count` oldest snapshots
    pub fn split_off_oldest(&mut self, count: usize) -> Vec<Snapshot> {
        let count = count.min(self.snapshots.len());
        self.snapshots.drain(..count).collect()
    }
}

impl<'a> IntoIterator for &'a TierHistory {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snap(tag: &str, timestamp: i64) -> Snapshot {
        Snapshot::new("tank/home", tag, timestamp)
    }

    #[test]
    fn test_full_name() {
        assert_eq!(snap("daily-2024-01-01", 0).full_name(), "tank/home@daily-2024-01-01");
    }

    #[test]
    fn test_history_sorted_on_build() {
        let history = TierHistory::from_snapshots(vec![snap("c", 30), snap("a", 10), snap("b", 20)]);
        let tags: Vec<&str> = history.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
        assert_eq!(history.latest().unwrap().tag, "c");
        assert_eq!(history.oldest().unwrap().tag, "a");
    }

    #[test]
    fn test_history_rejects_duplicate_tags() {
        let mut history = TierHistory::new();
        assert!(history.insert(snap("a", 10)));
        assert!(!history.insert(snap("a", 99)));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().timestamp, 10);
    }

    #[test]
    fn test_split_off_oldest() {
        let mut history = TierHistory::from_snapshots(vec![snap("a", 1), snap("b", 2), snap("c", 3)]);
        let removed = history.split_off_oldest(2);
        assert_eq!(removed.iter().map(|s| s.tag.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(history.len(), 1);

        let removed = history.split_off_oldest(5);
        assert_eq!(removed.len(), 1);
        assert!(history.is_empty());
    }

    proptest! {
        #[test]
        fn prop_history_is_sorted(timestamps in proptest::collection::vec(-1_000_000i64..1_000_000, 0..64)) {
            let history = TierHistory::from_snapshots(
                timestamps.iter().enumerate().map(|(i, ts)| snap(&format!("t{}", i), *ts)),
            );
            prop_assert_eq!(history.len(), timestamps.len());
            prop_assert!(history
                .as_slice()
                .windows(2)
                .all(|pair| pair[0].timestamp <= pair[1].timestamp));
        }
    }
}
