//! Retention decisions
//!
//! Pure functions behind the prune and create passes. They decide; the
//! engine executes.

use chrono::NaiveDateTime;
use zrotate_domain::{CalendarError, Snapshot, Tier, TierHistory};

/// Outcome of the prune decision for one (tier, dataset) history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrunePlan {
    /// Snapshots to destroy, oldest first
    pub destroy: Vec<Snapshot>,

    /// The `keep` newest snapshots
    pub survivors: TierHistory,
}

/// Split a history into the snapshots to destroy and those that survive
///
/// With `n > keep` snapshots, exactly the `n - keep` oldest are destroyed.
pub fn plan_prune(history: &TierHistory, keep: usize) -> PrunePlan {
    let mut survivors = history.clone();
    let excess = survivors.len().saturating_sub(keep);
    let destroy = survivors.split_off_oldest(excess);

    PrunePlan { destroy, survivors }
}

/// Outcome of the create decision for one (tier, dataset) history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateDecision {
    /// No snapshot of this tier exists yet
    Bootstrap {
        /// Tag to create
        tag: String,
    },

    /// The interval has elapsed and the candidate tag is new
    Due {
        /// Tag to create
        tag: String,
    },

    /// The latest snapshot is younger than the tier's interval
    IntervalPending {
        /// Tag of the latest snapshot
        latest: String,
        /// Unix time from which a new snapshot is allowed
        due_at: i64,
    },

    /// The candidate tag equals the latest snapshot's tag
    SameTag {
        /// The shared tag
        tag: String,
    },

    /// The history holds more than `keep` snapshots; nothing is created
    /// until pruning brings it back down
    OverRetained {
        /// Snapshots in the history
        count: usize,
        /// Tier keep-count
        keep: usize,
    },
}

impl CreateDecision {
    /// The tag to create, if the decision is to create
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Bootstrap { tag } | Self::Due { tag } => Some(tag),
            _ => None,
        }
    }
}

/// Decide whether a new snapshot of `tier` is due
///
/// `now_local` names the candidate tag; `now_ts` is the same moment as Unix
/// time and is compared against the latest snapshot plus the tier interval.
pub fn decide_create(
    history: &TierHistory,
    tier: &Tier,
    now_local: &NaiveDateTime,
    now_ts: i64,
) -> Result<CreateDecision, CalendarError> {
    let Some(latest) = history.latest() else {
        return Ok(CreateDecision::Bootstrap {
            tag: tier.naming.format(now_local)?,
        });
    };

    if history.len() > tier.keep {
        return Ok(CreateDecision::OverRetained {
            count: history.len(),
            keep: tier.keep,
        });
    }

    let interval = i64::try_from(tier.interval.as_secs()).unwrap_or(i64::MAX);
    let due_at = latest.timestamp.saturating_add(interval);
    if now_ts < due_at {
        return Ok(CreateDecision::IntervalPending {
            latest: latest.tag.clone(),
            due_at,
        });
    }

    let tag = tier.naming.format(now_local)?;
    if tag == latest.tag {
        return Ok(CreateDecision::SameTag { tag });
    }

    Ok(CreateDecision::Due { tag })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use zrotate_domain::{NamingPattern, Schedule};

    fn tier(pattern: &str, keep: usize, interval: Duration) -> Tier {
        Tier {
            name: "test".to_string(),
            schedule: Schedule::new("%M", "00").unwrap(),
            keep,
            interval,
            naming: NamingPattern::new(pattern).unwrap(),
            datasets: vec!["home".to_string()],
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn daily_history(days: std::ops::RangeInclusive<u32>) -> TierHistory {
        TierHistory::from_snapshots(days.map(|d| {
            Snapshot::new(
                "tank/home",
                format!("daily-2024-01-{:02}", d),
                at(2024, 1, d, 0, 0, 0).and_utc().timestamp(),
            )
        }))
    }

    #[test]
    fn test_prune_destroys_oldest_daily() {
        let plan = plan_prune(&daily_history(1..=8), 7);

        let destroyed: Vec<&str> = plan.destroy.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(destroyed, vec!["daily-2024-01-01"]);
        assert_eq!(plan.survivors.len(), 7);
        assert_eq!(plan.survivors.oldest().unwrap().tag, "daily-2024-01-02");
        assert_eq!(plan.survivors.latest().unwrap().tag, "daily-2024-01-08");
    }

    #[test]
    fn test_prune_under_keep_is_noop() {
        let history = daily_history(1..=3);
        let plan = plan_prune(&history, 7);
        assert!(plan.destroy.is_empty());
        assert_eq!(plan.survivors, history);
    }

    #[test]
    fn test_prune_keep_zero_destroys_everything() {
        let plan = plan_prune(&daily_history(1..=3), 0);
        assert_eq!(plan.destroy.len(), 3);
        assert!(plan.survivors.is_empty());
    }

    #[test]
    fn test_bootstrap_on_empty_history() {
        let tier = tier("hourly-%Y-%m-%d_%H_%M_%S", 24, Duration::from_secs(3300));
        let now = at(2024, 1, 1, 10, 0, 0);

        let decision = decide_create(&TierHistory::new(), &tier, &now, now.and_utc().timestamp()).unwrap();
        assert_eq!(
            decision,
            CreateDecision::Bootstrap {
                tag: "hourly-2024-01-01_10_00_00".to_string()
            }
        );
        assert_eq!(decision.tag(), Some("hourly-2024-01-01_10_00_00"));
    }

    #[test]
    fn test_interval_not_elapsed() {
        let tier = tier("daily-%Y-%m-%d", 7, Duration::from_secs(24 * 3600));
        let now = at(2024, 1, 5, 10, 0, 0);
        let latest = now.and_utc().timestamp() - 10 * 3600;
        let history = TierHistory::from_snapshots(vec![Snapshot::new("tank/home", "daily-2024-01-05", latest)]);

        let decision = decide_create(&history, &tier, &now, now.and_utc().timestamp()).unwrap();
        assert_eq!(
            decision,
            CreateDecision::IntervalPending {
                latest: "daily-2024-01-05".to_string(),
                due_at: latest + 24 * 3600,
            }
        );
        assert_eq!(decision.tag(), None);
    }

    #[test]
    fn test_due_when_interval_elapsed() {
        let tier = tier("daily-%Y-%m-%d", 7, Duration::from_secs(23 * 3600));
        let now = at(2024, 1, 8, 0, 0, 0);
        let history = daily_history(1..=7);

        let decision = decide_create(&history, &tier, &now, now.and_utc().timestamp()).unwrap();
        assert_eq!(decision.tag(), Some("daily-2024-01-08"));
        assert!(matches!(decision, CreateDecision::Due { .. }));
    }

    #[test]
    fn test_due_exactly_at_interval_boundary() {
        let tier = tier("daily-%Y-%m-%d", 7, Duration::from_secs(24 * 3600));
        let now = at(2024, 1, 2, 0, 0, 0);
        let history = daily_history(1..=1);

        let decision = decide_create(&history, &tier, &now, now.and_utc().timestamp()).unwrap();
        assert_eq!(decision.tag(), Some("daily-2024-01-02"));
    }

    #[test]
    fn test_same_tag_is_not_recreated() {
        // Zero interval: only the tag comparison prevents a duplicate
        let tier = tier("daily-%Y-%m-%d", 7, Duration::ZERO);
        let now = at(2024, 1, 3, 18, 0, 0);
        let history = daily_history(1..=3);

        let decision = decide_create(&history, &tier, &now, now.and_utc().timestamp()).unwrap();
        assert_eq!(
            decision,
            CreateDecision::SameTag {
                tag: "daily-2024-01-03".to_string()
            }
        );
    }

    #[test]
    fn test_over_retained_skips_create() {
        let tier = tier("daily-%Y-%m-%d", 2, Duration::from_secs(3600));
        let now = at(2024, 2, 1, 0, 0, 0);

        let decision = decide_create(&daily_history(1..=5), &tier, &now, now.and_utc().timestamp()).unwrap();
        assert_eq!(decision, CreateDecision::OverRetained { count: 5, keep: 2 });
    }

    #[test]
    fn test_unformattable_pattern_is_an_error() {
        let mut tier = tier("daily-%Y-%m-%d", 2, Duration::from_secs(3600));
        // Offset needs a time zone the naive moment does not carry
        tier.naming = NamingPattern::new("daily-%z").unwrap();
        let now = at(2024, 2, 1, 0, 0, 0);

        assert!(decide_create(&TierHistory::new(), &tier, &now, 0).is_err());
    }

    proptest! {
        #[test]
        fn prop_prune_keeps_newest(
            timestamps in proptest::collection::hash_set(0i64..1_000_000, 0..40),
            keep in 0usize..30,
        ) {
            let history = TierHistory::from_snapshots(
                timestamps.iter().map(|ts| Snapshot::new("tank/home", format!("snap-{}", ts), *ts)),
            );
            let plan = plan_prune(&history, keep);

            let mut sorted: Vec<i64> = timestamps.iter().copied().collect();
            sorted.sort_unstable();
            let excess = sorted.len().saturating_sub(keep);

            prop_assert!(plan.survivors.len() <= keep);
            prop_assert_eq!(plan.destroy.len(), excess);

            let destroyed: HashSet<i64> = plan.destroy.iter().map(|s| s.timestamp).collect();
            let survived: HashSet<i64> = plan.survivors.iter().map(|s| s.timestamp).collect();
            prop_assert_eq!(destroyed, sorted[..excess].iter().copied().collect::<HashSet<_>>());
            prop_assert_eq!(survived, sorted[excess..].iter().copied().collect::<HashSet<_>>());
        }

        #[test]
        fn prop_created_tag_never_repeats_latest(
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
        ) {
            let tier = tier("hourly-%Y-%m-%d_%H_%M_%S", 24, Duration::ZERO);
            let now = at(2024, 3, 10, hour, minute, second);
            let ts = now.and_utc().timestamp();

            let first = decide_create(&TierHistory::new(), &tier, &now, ts).unwrap();
            let tag = first.tag().unwrap().to_string();
            let history = TierHistory::from_snapshots(vec![Snapshot::new("tank/home", tag, ts)]);

            let second = decide_create(&history, &tier, &now, ts).unwrap();
            prop_assert_eq!(second.tag(), None);
        }
    }
}
