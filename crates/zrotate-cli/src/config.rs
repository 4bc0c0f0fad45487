//! Configuration file loading.
//!
//! The TOML document declares run settings, tier defaults, datasets, pools
//! and tiers. It is turned into a validated [`Topology`] plus an
//! [`EngineConfig`].

use crate::error::{CliError, Result};
use humantime_serde::re::humantime;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use zrotate_domain::{Dataset, NamingPattern, Pool, Schedule, Tier, TierPolicy, Topology};
use zrotate_engine::EngineConfig;

/// The configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Run settings
    #[serde(default)]
    pub settings: EngineConfig,

    /// Values inherited by every tier
    #[serde(default)]
    pub defaults: TierDefaults,

    /// Snapshotted datasets
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,

    /// Scrubbed pools
    #[serde(default)]
    pub pools: Vec<PoolEntry>,

    /// Retention tiers, in evaluation order
    #[serde(default)]
    pub tiers: Vec<TierEntry>,
}

/// Tier defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierDefaults {
    /// Schedule format
    pub format: Option<String>,
    /// Schedule time
    pub time: Option<String>,
    /// Snapshots kept per dataset
    pub keep: Option<usize>,
}

/// A `[[datasets]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetEntry {
    /// Id tiers refer to
    pub id: String,
    /// Storage path
    pub name: String,
    /// `"yes"` (any case) or `true`
    #[serde(default)]
    pub recursive: RecursiveFlag,
}

/// The `recursive` attribute, as a boolean or a word.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecursiveFlag {
    /// `recursive = true`
    Bool(bool),
    /// `recursive = "yes"`; any other word is false
    Word(String),
}

impl Default for RecursiveFlag {
    fn default() -> Self {
        RecursiveFlag::Bool(false)
    }
}

impl RecursiveFlag {
    /// Whether snapshots cascade to children.
    pub fn enabled(&self) -> bool {
        match self {
            RecursiveFlag::Bool(flag) => *flag,
            RecursiveFlag::Word(word) => word.trim().eq_ignore_ascii_case("yes"),
        }
    }
}

/// A `[[pools]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolEntry {
    /// Pool name
    pub name: String,
    /// Scrub schedule
    pub scrub: ScheduleEntry,
}

/// A `{ format, time }` schedule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleEntry {
    /// Calendar format
    pub format: String,
    /// Moment in that format
    pub time: String,
}

/// A `[[tiers]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierEntry {
    /// Tier name
    pub name: String,
    /// Naming pattern (defaults from the built-in policy)
    pub snapshot: Option<String>,
    /// Interval such as `1h` or `+1 day` (defaults from the built-in policy)
    pub diff: Option<String>,
    /// Overrides `defaults.keep`
    pub keep: Option<usize>,
    /// Overrides `defaults.format`
    pub format: Option<String>,
    /// Overrides `defaults.time`
    pub time: Option<String>,
    /// Ids of member datasets
    #[serde(default)]
    pub datasets: Vec<String>,
}

impl ConfigFile {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse a configuration document.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Build and validate the topology.
    ///
    /// A tier reference to an unknown dataset id is dropped with a warning.
    pub fn topology(&self) -> Result<Topology> {
        let datasets = self
            .datasets
            .iter()
            .map(|entry| {
                let id = entry.id.trim();
                let name = entry.name.trim();
                if id.is_empty() || name.is_empty() {
                    return Err(CliError::Config("dataset with empty id or name".to_string()));
                }
                Ok(Dataset::new(id, name, entry.recursive.enabled()))
            })
            .collect::<Result<Vec<_>>>()?;

        let pools = self
            .pools
            .iter()
            .map(|entry| {
                let scrub = Schedule::new(&entry.scrub.format, &entry.scrub.time)
                    .map_err(|e| CliError::Config(format!("pool {}: {}", entry.name, e)))?;
                Ok(Pool::new(entry.name.trim(), scrub))
            })
            .collect::<Result<Vec<_>>>()?;

        let known: HashSet<&str> = datasets.iter().map(|d| d.id.as_str()).collect();
        let tiers = self
            .tiers
            .iter()
            .map(|entry| self.tier(entry, &known))
            .collect::<Result<Vec<_>>>()?;

        Ok(Topology::new(datasets, pools, tiers)?)
    }

    fn tier(&self, entry: &TierEntry, known: &HashSet<&str>) -> Result<Tier> {
        let name = entry.name.trim();
        let missing = |what: &str| CliError::Config(format!("tier {} has no {}", name, what));
        let policy = TierPolicy::builtin(name);

        let format = entry.format.as_ref().or(self.defaults.format.as_ref()).ok_or_else(|| missing("format"))?;
        let time = entry.time.as_ref().or(self.defaults.time.as_ref()).ok_or_else(|| missing("time"))?;
        let keep = entry.keep.or(self.defaults.keep).ok_or_else(|| missing("keep"))?;

        let schedule = Schedule::new(format, time).map_err(|e| CliError::Config(format!("tier {}: {}", name, e)))?;

        let pattern = match (&entry.snapshot, policy) {
            (Some(pattern), _) => pattern.as_str(),
            (None, Some(policy)) => policy.pattern,
            (None, None) => return Err(missing("snapshot pattern")),
        };
        let naming = NamingPattern::new(pattern).map_err(|e| CliError::Config(format!("tier {}: {}", name, e)))?;

        let interval = match (&entry.diff, policy) {
            (Some(diff), _) => {
                parse_interval(diff).map_err(|e| CliError::Config(format!("tier {}: diff '{}': {}", name, diff, e)))?
            }
            (None, Some(policy)) => policy.interval,
            (None, None) => return Err(missing("diff")),
        };

        let mut datasets = Vec::with_capacity(entry.datasets.len());
        for id in entry.datasets.iter().map(|id| id.trim()) {
            if known.contains(id) {
                datasets.push(id.to_string());
            } else {
                tracing::warn!(tier = %name, dataset = %id, "Tier refers to an unknown dataset, ignoring it");
            }
        }

        Ok(Tier {
            name: name.to_string(),
            schedule,
            keep,
            interval,
            naming,
            datasets,
        })
    }
}

/// Parse an interval such as `1h`, `23 hours` or `+1 day`.
pub fn parse_interval(text: &str) -> std::result::Result<Duration, String> {
    let compact: String = text
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    humantime::parse_duration(&compact).map_err(|e| e.to_string())
}
