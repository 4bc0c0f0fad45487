//! Tier module - retention policies for snapshots

use crate::naming::NamingPattern;
use crate::schedule::Schedule;
use std::time::Duration;

/// A retention tier
///
/// Tiers are plain data: every tier runs through the same engine, and only
/// its schedule, keep-count, interval and naming pattern differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    /// Tier name, e.g. `hourly`
    pub name: String,

    /// When this tier's create pass runs
    pub schedule: Schedule,

    /// Snapshots retained per dataset
    pub keep: usize,

    /// Minimum time between two snapshots of this tier
    pub interval: Duration,

    /// Template that names (and dates) this tier's snapshots
    pub naming: NamingPattern,

    /// Ids of the datasets assigned to this tier
    pub datasets: Vec<String>,
}

/// Built-in naming pattern and interval for a well-known tier name
///
/// Used when a configured tier leaves `snapshot` or `diff` unset. Intervals sit
/// slightly under the tier's period; duplicate creation within one period is
/// prevented by the tag comparison in the create pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    /// Tier name
    pub name: &'static str,

    /// Naming pattern
    pub pattern: &'static str,

    /// Minimum interval between snapshots
    pub interval: Duration,
}

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

const BUILTIN_POLICIES: [TierPolicy; 5] = [
    TierPolicy {
        name: "hourly",
        pattern: "hourly-%Y-%m-%d_%H_%M_%S",
        interval: Duration::from_secs(55 * 60),
    },
    TierPolicy {
        name: "daily",
        pattern: "daily-%Y-%m-%d",
        interval: Duration::from_secs(23 * HOUR),
    },
    TierPolicy {
        name: "weekly",
        pattern: "weekly-%Y-%W",
        interval: Duration::from_secs(6 * DAY),
    },
    TierPolicy {
        name: "monthly",
        pattern: "monthly-%Y-%m",
        interval: Duration::from_secs(27 * DAY),
    },
    TierPolicy {
        name: "yearly",
        pattern: "yearly-%Y",
        interval: Duration::from_secs(364 * DAY),
    },
];

impl TierPolicy {
    /// Look up the built-in policy for a tier name (case-insensitive)
    pub fn builtin(name: &str) -> Option<&'static TierPolicy> {
        BUILTIN_POLICIES
            .iter()
            .find(|policy| policy.name.eq_ignore_ascii_case(name))
    }

    /// All built-in policies
    pub fn all() -> &'static [TierPolicy] {
        &BUILTIN_POLICIES
    }
}
