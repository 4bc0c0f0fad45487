//! Topology module - the datasets, pools and tiers a run operates on
//!
//! Built once per run from configuration and immutable thereafter.

use crate::dataset::{Dataset, Pool};
use crate::tier::Tier;
use std::collections::HashSet;
use std::fmt;

/// Structural problems in a topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Two datasets share an id
    DuplicateDatasetId(String),

    /// Two datasets share a storage name
    DuplicateDatasetName(String),

    /// Two pools share a name
    DuplicatePool(String),

    /// Two tiers share a name
    DuplicateTier(String),

    /// A tier references a dataset id that is not declared
    UnknownDataset {
        /// Tier name
        tier: String,
        /// Referenced dataset id
        id: String,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::DuplicateDatasetId(id) => write!(f, "dataset id '{}' is declared twice", id),
            TopologyError::DuplicateDatasetName(name) => {
                write!(f, "dataset '{}' is declared twice", name)
            }
            TopologyError::DuplicatePool(name) => write!(f, "pool '{}' is declared twice", name),
            TopologyError::DuplicateTier(name) => write!(f, "tier '{}' is declared twice", name),
            TopologyError::UnknownDataset { tier, id } => {
                write!(f, "tier '{}' references unknown dataset id '{}'", tier, id)
            }
        }
    }
}

impl std::error::Error for TopologyError {}

/// Datasets, pools and tiers, validated for uniqueness and references
#[derive(Debug, Clone, Default)]
pub struct Topology {
    datasets: Vec<Dataset>,
    pools: Vec<Pool>,
    tiers: Vec<Tier>,
}

impl Topology {
    /// Build a topology
    pub fn new(datasets: Vec<Dataset>, pools: Vec<Pool>, tiers: Vec<Tier>) -> Result<Self, TopologyError> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for dataset in &datasets {
            if !ids.insert(dataset.id.as_str()) {
                return Err(TopologyError::DuplicateDatasetId(dataset.id.clone()));
            }
            if !names.insert(dataset.name.as_str()) {
                return Err(TopologyError::DuplicateDatasetName(dataset.name.clone()));
            }
        }

        let mut pool_names = HashSet::new();
        for pool in &pools {
            if !pool_names.insert(pool.name.as_str()) {
                return Err(TopologyError::DuplicatePool(pool.name.clone()));
            }
        }

        let mut tier_names = HashSet::new();
        for tier in &tiers {
            if !tier_names.insert(tier.name.as_str()) {
                return Err(TopologyError::DuplicateTier(tier.name.clone()));
            }
            if let Some(id) = tier.datasets.iter().find(|id| !ids.contains(id.as_str())) {
                return Err(TopologyError::UnknownDataset {
                    tier: tier.name.clone(),
                    id: id.clone(),
                });
            }
        }

        Ok(Self {
            datasets,
            pools,
            tiers,
        })
    }

    /// All datasets, in declaration order
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// All pools, in declaration order
    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// All tiers, in declaration order
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Find a dataset by id
    pub fn dataset_by_id(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// Find a dataset by storage name
    pub fn dataset_by_name(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Find a tier by name
    pub fn tier(&self, name: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Datasets assigned to a tier, in the tier's order
    pub fn tier_datasets<'a>(&'a self, tier: &'a Tier) -> impl Iterator<Item = &'a Dataset> + 'a {
        tier.datasets.iter().filter_map(move |id| self.dataset_by_id(id))
    }

    /// Storage names of all datasets
    pub fn dataset_names(&self) -> HashSet<&str> {
        self.datasets.iter().map(|d| d.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NamingPattern;
    use crate::schedule::Schedule;
    use std::time::Duration;

    fn tier(name: &str, datasets: &[&str]) -> Tier {
        Tier {
            name: name.to_string(),
            schedule: Schedule::new("%M", "00").unwrap(),
            keep: 24,
            interval: Duration::from_secs(3600),
            naming: NamingPattern::new(format!("{}-%Y-%m-%d_%H_%M_%S", name)).unwrap(),
            datasets: datasets.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn datasets() -> Vec<Dataset> {
        vec![
            Dataset::new("home", "tank/home", true),
            Dataset::new("media", "tank/media", false),
        ]
    }

    #[test]
    fn test_lookups() {
        let topology = Topology::new(datasets(), vec![], vec![tier("hourly", &["media", "home"])]).unwrap();

        assert_eq!(topology.dataset_by_id("home").unwrap().name, "tank/home");
        assert_eq!(topology.dataset_by_name("tank/media").unwrap().id, "media");
        assert!(topology.dataset_by_id("missing").is_none());
        assert!(topology.dataset_by_name("tank").is_none());
        assert!(topology.tier("daily").is_none());

        let hourly = topology.tier("hourly").unwrap();
        let names: Vec<&str> = topology.tier_datasets(hourly).map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["tank/media", "tank/home"]);
    }

    #[test]
    fn test_duplicate_dataset_id() {
        let mut ds = datasets();
        ds.push(Dataset::new("home", "tank/other", false));
        assert_eq!(
            Topology::new(ds, vec![], vec![]).unwrap_err(),
            TopologyError::DuplicateDatasetId("home".to_string())
        );
    }

    #[test]
    fn test_duplicate_dataset_name() {
        let mut ds = datasets();
        ds.push(Dataset::new("other", "tank/home", false));
        assert!(matches!(
            Topology::new(ds, vec![], vec![]),
            Err(TopologyError::DuplicateDatasetName(_))
        ));
    }

    #[test]
    fn test_duplicate_pool() {
        let schedule = Schedule::new("%H:%M %d", "02:00 01").unwrap();
        let pools = vec![Pool::new("tank", schedule.clone()), Pool::new("tank", schedule)];
        assert!(matches!(
            Topology::new(datasets(), pools, vec![]),
            Err(TopologyError::DuplicatePool(_))
        ));
    }

    #[test]
    fn test_duplicate_tier() {
        let tiers = vec![tier("hourly", &["home"]), tier("hourly", &["media"])];
        assert!(matches!(
            Topology::new(datasets(), vec![], tiers),
            Err(TopologyError::DuplicateTier(_))
        ));
    }

    #[test]
    fn test_unknown_dataset_reference() {
        let err = Topology::new(datasets(), vec![], vec![tier("daily", &["home", "ghost"])]).unwrap_err();
        assert_eq!(
            err,
            TopologyError::UnknownDataset {
                tier: "daily".to_string(),
                id: "ghost".to_string()
            }
        );
        assert!(err.to_string().contains("ghost"));
    }
}
