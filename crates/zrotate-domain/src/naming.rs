//! Snapshot naming patterns
//!
//! A naming pattern is a strftime-style template such as
//! `daily-%Y-%m-%d`. It generates the tag for a new snapshot and parses
//! existing tags back into the moment they were taken.

use crate::calendar::{self, CalendarError, WeekNumbering};
use chrono::{NaiveDateTime, NaiveTime, TimeZone};

/// How a parsed tag is turned into a moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Compose the moment from the parsed calendar fields
    Calendar,

    /// Read year and week number straight from the tag and take the first
    /// day of that week (generic week-of-year parsing is not portable)
    Week(WeekNumbering),
}

/// A tier's snapshot naming pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPattern {
    pattern: String,
    resolution: Resolution,
}

const WEEK_SPECIFIERS: [char; 3] = ['U', 'W', 'V'];

impl NamingPattern {
    /// Build a pattern, rejecting unknown strftime specifiers
    ///
    /// Patterns carrying a week number (`%U`, `%W`, `%V`) resolve with
    /// [`Resolution::Week`] in that specifier's convention.
    pub fn new(pattern: impl Into<String>) -> Result<Self, CalendarError> {
        let pattern = pattern.into();
        calendar::validate_format(&pattern)?;

        let resolution = specifiers(&pattern)
            .into_iter()
            .find_map(WeekNumbering::from_specifier)
            .map_or(Resolution::Calendar, Resolution::Week);

        Ok(Self { pattern, resolution })
    }

    /// The raw template
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// How tags of this pattern resolve to a moment
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Generate the tag for a snapshot taken at `moment`
    pub fn format(&self, moment: &NaiveDateTime) -> Result<String, CalendarError> {
        calendar::format_naive(moment, &self.pattern)
    }

    /// Parse a tag back into the local moment it names
    ///
    /// The tag must match the pattern as a whole first; a mismatch means the
    /// snapshot belongs to another tier or to nobody.
    pub fn parse(&self, tag: &str) -> Result<NaiveDateTime, CalendarError> {
        let fields = calendar::parse_fields(tag, &self.pattern)?;

        match self.resolution {
            Resolution::Calendar => fields.to_naive_datetime(tag),
            Resolution::Week(numbering) => {
                let (year, week) = split_year_week(tag, &self.pattern)?;
                calendar::week_start(year, week, numbering)
                    .map(|date| date.and_time(NaiveTime::MIN))
                    .ok_or_else(|| CalendarError::OutOfRange(tag.to_string()))
            }
        }
    }

    /// Parse a tag and convert it to a Unix timestamp in `tz`
    pub fn resolve<Tz: TimeZone>(&self, tag: &str, tz: &Tz) -> Result<i64, CalendarError> {
        let moment = self.parse(tag)?;
        calendar::local_timestamp(tz, &moment)
    }
}

impl std::fmt::Display for NamingPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Extract `(year, week)` from a weekly tag by splitting on its separators
///
/// The literal prefix of the pattern is stripped, the remainder is split on
/// every non-digit character, and the numeric components are matched in
/// order against the pattern's numeric specifiers. The components at the
/// positions of `%Y` and of the week specifier are returned.
pub fn split_year_week(tag: &str, pattern: &str) -> Result<(i32, u32), CalendarError> {
    let mismatch = |reason: &str| CalendarError::Mismatch {
        input: tag.to_string(),
        format: pattern.to_string(),
        reason: reason.to_string(),
    };

    let prefix = pattern.split('%').next().unwrap_or_default();
    let rest = tag
        .strip_prefix(prefix)
        .ok_or_else(|| mismatch("literal prefix differs"))?;

    let components: Vec<&str> = rest
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .collect();

    let numeric: Vec<char> = specifiers(pattern)
        .into_iter()
        .filter(|c| NUMERIC_SPECIFIERS.contains(c))
        .collect();

    if components.len() != numeric.len() {
        return Err(mismatch("numeric components do not line up with the pattern"));
    }

    let year_at = numeric
        .iter()
        .position(|c| *c == 'Y' || *c == 'G')
        .ok_or_else(|| mismatch("pattern has no year"))?;
    let week_at = numeric
        .iter()
        .position(|c| WEEK_SPECIFIERS.contains(c))
        .ok_or_else(|| mismatch("pattern has no week number"))?;

    let year = components[year_at]
        .parse::<i32>()
        .map_err(|_| mismatch("year is not a number"))?;
    let week = components[week_at]
        .parse::<u32>()
        .map_err(|_| mismatch("week is not a number"))?;

    Ok((year, week))
}

const NUMERIC_SPECIFIERS: [char; 21] = [
    'Y', 'C', 'y', 'm', 'd', 'e', 'H', 'k', 'I', 'l', 'M', 'S', 'j', 'U', 'W', 'V', 'G', 'g', 'u',
    'w', 's',
];

/// Conversion specifiers of a strftime pattern, in order
///
/// Composite specifiers are expanded (`%F`, `%T`, `%D`, `%R`) and padding
/// modifiers are skipped.
fn specifiers(pattern: &str) -> Vec<char> {
    let mut out = Vec::new();
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }

        let mut spec = chars.next();
        while matches!(spec, Some('-' | '_' | '0' | '#')) {
            spec = chars.next();
        }

        match spec {
            Some('F') => out.extend(['Y', 'm', 'd']),
            Some('T') => out.extend(['H', 'M', 'S']),
            Some('D') => out.extend(['m', 'd', 'y']),
            Some('R') => out.extend(['H', 'M']),
            Some('%') | None => {}
            Some(other) => out.push(other),
        }
    }

    out
}
