//! Check command implementation.

use crate::error::Result;
use crate::output::Formatter;
use zrotate_domain::Topology;

/// Execute the check command.
///
/// Returns the schedules whose time cannot be read with their own format.
/// Such a schedule never matches during a run.
pub fn execute_check(topology: &Topology, formatter: &Formatter) -> Result<Vec<String>> {
    let problems = schedule_problems(topology);
    for problem in &problems {
        tracing::warn!("{}", problem);
    }

    let output = formatter.format_topology(topology, &problems)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(problems)
}

/// Describe every tier and pool schedule that fails to evaluate.
pub fn schedule_problems(topology: &Topology) -> Vec<String> {
    let tiers = topology
        .tiers()
        .iter()
        .filter_map(|tier| tier.schedule.moment().err().map(|e| format!("tier {}: {}", tier.name, e)));
    let pools = topology
        .pools()
        .iter()
        .filter_map(|pool| pool.scrub.moment().err().map(|e| format!("pool {}: {}", pool.name, e)));
    tiers.chain(pools).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use zrotate_domain::{Dataset, NamingPattern, Pool, Schedule, Tier};

    fn tier(name: &str, format: &str, time: &str) -> Tier {
        Tier {
            name: name.to_string(),
            schedule: Schedule::new(format, time).unwrap(),
            keep: 7,
            interval: Duration::from_secs(23 * 3600),
            naming: NamingPattern::new("daily-%Y-%m-%d").unwrap(),
            datasets: vec!["home".to_string()],
        }
    }

    #[test]
    fn test_valid_schedules() {
        let topology = Topology::new(
            vec![Dataset::new("home", "tank/home", false)],
            vec![Pool::new("tank", Schedule::new("%H:%M %d", "02:00 01").unwrap())],
            vec![tier("daily", "%H:%M", "00:00")],
        )
        .unwrap();

        assert!(schedule_problems(&topology).is_empty());
    }

    #[test]
    fn test_unreadable_times_are_reported() {
        let topology = Topology::new(
            vec![Dataset::new("home", "tank/home", false)],
            vec![Pool::new("tank", Schedule::new("%H:%M", "2am").unwrap())],
            vec![tier("daily", "%H:%M", "midnight")],
        )
        .unwrap();

        let problems = schedule_problems(&topology);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("tier daily: 'midnight' does not match '%H:%M'"));
        assert!(problems[1].starts_with("pool tank: '2am' does not match '%H:%M'"));
    }
}
