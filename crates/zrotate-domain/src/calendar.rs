//! Calendar primitives
//!
//! strftime-style formatting and parsing on top of `chrono`, with the
//! defaults a C `strptime`/`mktime` pair would apply to missing fields.
//! Week numbers are never trusted from a generic parse; see [`week_start`]
//! and [`iso_week_start`].

use chrono::format::{self, Item, Parsed, StrftimeItems};
use chrono::{Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use std::fmt::{self, Write};

/// Errors raised while formatting or parsing calendar values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// The format string contains an unknown or malformed specifier
    InvalidFormat(String),

    /// A moment could not be rendered with the format (e.g. `%z` on a naive time)
    Unformattable(String),

    /// The input does not match the format
    Mismatch {
        /// Text that was parsed
        input: String,
        /// Format it was parsed against
        format: String,
        /// Parser diagnostic
        reason: String,
    },

    /// The input matched but lacks a field needed to build a moment
    Incomplete {
        /// Text that was parsed
        input: String,
        /// Name of the missing field
        missing: &'static str,
    },

    /// The parsed fields do not form a valid date or time
    OutOfRange(String),

    /// The local time does not exist in the time zone
    NonexistentLocalTime(NaiveDateTime),
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::InvalidFormat(format) => write!(f, "invalid calendar format '{}'", format),
            CalendarError::Unformattable(format) => {
                write!(f, "cannot render a local time with format '{}'", format)
            }
            CalendarError::Mismatch { input, format, reason } => {
                write!(f, "'{}' does not match '{}': {}", input, format, reason)
            }
            CalendarError::Incomplete { input, missing } => {
                write!(f, "'{}' has no {} field", input, missing)
            }
            CalendarError::OutOfRange(input) => write!(f, "'{}' is not a valid calendar moment", input),
            CalendarError::NonexistentLocalTime(naive) => {
                write!(f, "local time {} does not exist", naive)
            }
        }
    }
}

impl std::error::Error for CalendarError {}

/// Calendar fields recovered from a strftime-style parse
///
/// Only the fields the format actually mentions are set, so two values parsed
/// with the same format compare at that format's granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CalendarFields {
    /// Full year
    pub year: Option<i32>,
    /// Month, 1-12
    pub month: Option<u32>,
    /// Day of month, 1-31
    pub day: Option<u32>,
    /// Hour, 0-23
    pub hour: Option<u32>,
    /// Minute, 0-59
    pub minute: Option<u32>,
    /// Second, 0-60
    pub second: Option<u32>,
    /// Week number (any of `%U`, `%W`, `%V`)
    pub week: Option<u32>,
    /// Day of week
    pub weekday: Option<Weekday>,
    /// Day of year, 1-366
    pub ordinal: Option<u32>,
}

impl CalendarFields {
    fn from_parsed(parsed: &Parsed) -> Self {
        let year = parsed.year.or_else(|| {
            // POSIX %y pivot: 69-99 => 19xx, 00-68 => 20xx
            parsed
                .year_mod_100
                .map(|yy| if yy >= 69 { 1900 + yy } else { 2000 + yy })
        });

        let hour = match (parsed.hour_div_12, parsed.hour_mod_12) {
            (Some(div), Some(rem)) => Some(div * 12 + rem),
            (None, Some(rem)) => Some(rem),
            _ => None,
        };

        Self {
            year,
            month: parsed.month,
            day: parsed.day,
            hour,
            minute: parsed.minute,
            second: parsed.second,
            week: parsed.isoweek.or(parsed.week_from_mon).or(parsed.week_from_sun),
            weekday: parsed.weekday,
            ordinal: parsed.ordinal,
        }
    }

    /// Compose a local wall-clock moment from the parsed fields
    ///
    /// The year is required. Missing fields default to the start of their
    /// period: month 1, day 1, 00:00:00.
    pub fn to_naive_datetime(&self, input: &str) -> Result<NaiveDateTime, CalendarError> {
        let year = self.year.ok_or(CalendarError::Incomplete {
            input: input.to_string(),
            missing: "year",
        })?;

        let date = match (self.month, self.day, self.ordinal) {
            (None, None, Some(ordinal)) => NaiveDate::from_yo_opt(year, ordinal),
            (month, day, _) => NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1)),
        }
        .ok_or_else(|| CalendarError::OutOfRange(input.to_string()))?;

        let time = NaiveTime::from_hms_opt(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
        )
        .ok_or_else(|| CalendarError::OutOfRange(input.to_string()))?;

        Ok(date.and_time(time))
    }
}

/// Check that a strftime-style format only uses known specifiers
pub fn validate_format(format: &str) -> Result<(), CalendarError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(CalendarError::InvalidFormat(format.to_string()));
    }
    Ok(())
}

/// Render a local wall-clock moment with a strftime-style format
pub fn format_naive(moment: &NaiveDateTime, format: &str) -> Result<String, CalendarError> {
    validate_format(format)?;

    let mut out = String::new();
    write!(out, "{}", moment.format(format))
        .map_err(|_| CalendarError::Unformattable(format.to_string()))?;
    Ok(out)
}

/// Parse text against a strftime-style format into its calendar fields
///
/// The whole input must be consumed.
pub fn parse_fields(input: &str, format: &str) -> Result<CalendarFields, CalendarError> {
    validate_format(format)?;

    let mut parsed = Parsed::default();
    format::parse(&mut parsed, input, StrftimeItems::new(format)).map_err(|e| {
        CalendarError::Mismatch {
            input: input.to_string(),
            format: format.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(CalendarFields::from_parsed(&parsed))
}

/// First day (Monday) of ISO-8601 week `week` of `year`
///
/// Computed as the Monday of ISO week 1 plus `week - 1` weeks, so week 0
/// (what `%W` yields before the first Monday) lands on the Monday before ISO
/// week 1 and week 53 of a 52-week year on ISO week 1 of the next year.
/// Returns `None` for weeks above 53.
pub fn iso_week_start(year: i32, week: u32) -> Option<NaiveDate> {
    if week > 53 {
        return None;
    }

    let week_one = NaiveDate::from_isoywd_opt(year, 1, Weekday::Mon)?;
    week_one.checked_add_signed(Duration::weeks(i64::from(week) - 1))
}

/// Week-of-year convention of a week number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekNumbering {
    /// `%W`: week 1 begins on the first Monday of the year
    Monday,
    /// `%U`: week 1 begins on the first Sunday of the year
    Sunday,
    /// `%V`: ISO-8601 weeks
    Iso,
}

impl WeekNumbering {
    /// Convention of a strftime week specifier letter
    pub fn from_specifier(spec: char) -> Option<Self> {
        match spec {
            'W' => Some(WeekNumbering::Monday),
            'U' => Some(WeekNumbering::Sunday),
            'V' => Some(WeekNumbering::Iso),
            _ => None,
        }
    }
}

/// First day of week `week` of `year` under `numbering`
///
/// For `%W` and `%U`, week 1 starts on the year's first Monday (Sunday) and
/// week `n` starts `n - 1` weeks later. Week 0 holds the days before that
/// and starts on January 1, so tags of consecutive weeks resolve in order
/// across a year boundary. A week that does not exist in `year` is `None`.
/// ISO weeks defer to [`iso_week_start`].
pub fn week_start(year: i32, week: u32, numbering: WeekNumbering) -> Option<NaiveDate> {
    let first_day = match numbering {
        WeekNumbering::Iso => return iso_week_start(year, week),
        WeekNumbering::Monday => Weekday::Mon,
        WeekNumbering::Sunday => Weekday::Sun,
    };
    if week > 53 {
        return None;
    }

    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = (7 + first_day.num_days_from_monday() - jan_first.weekday().num_days_from_monday()) % 7;

    if week == 0 {
        // No week 0 when the year opens on the first day of week 1
        return (offset > 0).then_some(jan_first);
    }

    let start = jan_first.checked_add_signed(Duration::days(i64::from(offset) + 7 * (i64::from(week) - 1)))?;
    (start.year() == year).then_some(start)
}

/// Unix timestamp of a local wall-clock moment in `tz`
///
/// Ambiguous moments (DST fall-back) take the earlier instant. Moments inside
/// a DST gap resolve one hour later.
pub fn local_timestamp<Tz: TimeZone>(tz: &Tz, moment: &NaiveDateTime) -> Result<i64, CalendarError> {
    match tz.from_local_datetime(moment) {
        LocalResult::Single(dt) => Ok(dt.timestamp()),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.timestamp()),
        LocalResult::None => {
            let shifted = *moment + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.timestamp())
                .ok_or(CalendarError::NonexistentLocalTime(*moment))
        }
    }
}

/// ISO year and week of a date, as `(year, week)`
pub fn iso_year_week(date: &NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}
