//! Scrub scheduling

use zrotate_domain::CommandOutput;

/// Marker `zpool status` prints while a scrub is running
pub const SCRUB_IN_PROGRESS: &str = "scrub in progress";

/// Whether any status line reports a running scrub
pub fn scrub_in_progress<S: AsRef<str>>(lines: &[S]) -> bool {
    lines.iter().any(|line| line.as_ref().contains(SCRUB_IN_PROGRESS))
}

/// What to do with a pool whose scrub schedule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubDecision {
    /// No scrub is running; start one
    Start,

    /// A scrub is already running; leave it alone
    AlreadyRunning,
}

/// Decide from a successful status probe
pub fn decide(status: &CommandOutput) -> ScrubDecision {
    if scrub_in_progress(&status.lines) {
        ScrubDecision::AlreadyRunning
    } else {
        ScrubDecision::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_scrub_is_detected() {
        let status = CommandOutput::ok([
            "  pool: tank",
            " state: ONLINE",
            "  scan: scrub in progress since Sun Jan  7 02:00:01 2024",
            "config:",
        ]);
        assert_eq!(decide(&status), ScrubDecision::AlreadyRunning);
    }

    #[test]
    fn test_idle_pool_starts() {
        let status = CommandOutput::ok([
            "  pool: tank",
            " state: ONLINE",
            "  scan: scrub repaired 0B in 01:02:03 with 0 errors on Sun Dec 10 03:02:04 2023",
        ]);
        assert_eq!(decide(&status), ScrubDecision::Start);
        assert_eq!(decide(&CommandOutput::ok(Vec::<String>::new())), ScrubDecision::Start);
    }
}
