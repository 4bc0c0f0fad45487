//! Schedule windows
//!
//! A schedule pairs a calendar format with a configured moment, e.g. format
//! `%H:%M %d` and time `02:00 01` (02:00 on the first of every month). The
//! current time matches when, rendered and re-parsed with the same format,
//! it yields exactly the configured fields.

use crate::calendar::{self, CalendarError, CalendarFields};
use chrono::NaiveDateTime;

/// A configured moment at a format's granularity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    format: String,
    time: String,
}

impl Schedule {
    /// Create a schedule, rejecting unknown strftime specifiers
    ///
    /// The time itself is only parsed when the schedule is evaluated.
    pub fn new(format: impl Into<String>, time: impl Into<String>) -> Result<Self, CalendarError> {
        let format = format.into();
        calendar::validate_format(&format)?;

        Ok(Self {
            format,
            time: time.into(),
        })
    }

    /// The calendar format
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The configured time, as written
    pub fn time(&self) -> &str {
        &self.time
    }

    /// The configured moment parsed at the format's granularity
    pub fn moment(&self) -> Result<CalendarFields, CalendarError> {
        calendar::parse_fields(&self.time, &self.format)
    }

    /// Whether `now` falls on the configured moment
    pub fn matches(&self, now: &NaiveDateTime) -> Result<bool, CalendarError> {
        let configured = self.moment()?;
        let rendered = calendar::format_naive(now, &self.format)?;
        let current = calendar::parse_fields(&rendered, &self.format)?;
        Ok(configured == current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 17)
            .unwrap()
    }

    #[test]
    fn test_minute_schedule() {
        let schedule = Schedule::new("%M", "00").unwrap();
        assert!(schedule.matches(&at(2024, 1, 8, 14, 0)).unwrap());
        assert!(schedule.matches(&at(2024, 1, 8, 15, 0)).unwrap());
        assert!(!schedule.matches(&at(2024, 1, 8, 14, 1)).unwrap());
    }

    #[test]
    fn test_monthly_scrub_schedule() {
        let schedule = Schedule::new("%H:%M %d", "02:00 01").unwrap();
        assert!(schedule.matches(&at(2024, 3, 1, 2, 0)).unwrap());
        assert!(!schedule.matches(&at(2024, 3, 2, 2, 0)).unwrap());
        assert!(!schedule.matches(&at(2024, 3, 1, 3, 0)).unwrap());
    }

    #[test]
    fn test_weekday_schedule() {
        let schedule = Schedule::new("%a %H", "Sun 03").unwrap();
        // 2024-01-07 is a Sunday
        assert!(schedule.matches(&at(2024, 1, 7, 3, 0)).unwrap());
        assert!(!schedule.matches(&at(2024, 1, 8, 3, 0)).unwrap());
    }

    #[test]
    fn test_unparseable_time_is_an_error() {
        let schedule = Schedule::new("%H:%M", "noon").unwrap();
        assert!(schedule.moment().is_err());
        assert!(schedule.matches(&at(2024, 1, 8, 12, 0)).is_err());
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Schedule::new("%Q", "1").is_err());
    }
}
