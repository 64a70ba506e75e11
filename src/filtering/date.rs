//! Date and date-interval parsing for date filters.

use chrono::{DateTime, NaiveDate};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, or the date part of an RFC 3339 timestamp.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Parse a filter atom date: `YYYY-MM-DD` only.
#[must_use]
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A closed interval of dates, encoded as `<from>/<to>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateInterval {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateInterval {
    /// Create an interval; `None` when `from` is after `to`.
    #[must_use]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    /// Parse `<from>/<to>` with both ends `YYYY-MM-DD`. Anything else,
    /// including timestamps or a reversed interval, is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (from, to) = value.split_once('/')?;
        Self::new(parse_calendar_date(from)?, parse_calendar_date(to)?)
    }

    /// The first atom that parses as an interval.
    #[must_use]
    pub fn first_valid(atoms: &[String]) -> Option<Self> {
        atoms.iter().find_map(|atom| Self::parse(atom))
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", format_date(self.from), format_date(self.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-03-01"), Some(date(2024, 3, 1)));
        assert_eq!(
            parse_date("2024-03-01T23:10:00+02:00"),
            Some(date(2024, 3, 1))
        );
        assert_eq!(parse_date("03/01/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_interval_parse_and_contains() {
        let interval = DateInterval::parse("2024-01-01/2024-01-31").expect("valid interval");
        assert!(interval.contains(date(2024, 1, 1)));
        assert!(interval.contains(date(2024, 1, 31)));
        assert!(!interval.contains(date(2024, 2, 1)));
        assert_eq!(interval.encode(), "2024-01-01/2024-01-31");
    }

    #[test]
    fn test_malformed_intervals() {
        assert_eq!(DateInterval::parse("2024-01-01"), None);
        assert_eq!(DateInterval::parse("2024-02-01/2024-01-01"), None);
        assert_eq!(DateInterval::parse("yesterday/today"), None);
        assert_eq!(
            DateInterval::parse("2024-01-01T00:00:00Z/2024-01-31T00:00:00Z"),
            None
        );
    }

    #[test]
    fn test_calendar_date_is_strict() {
        assert_eq!(parse_calendar_date(" 2024-03-01 "), Some(date(2024, 3, 1)));
        assert_eq!(parse_calendar_date("2024-03-01T23:10:00+02:00"), None);
    }

    #[test]
    fn test_first_valid_interval() {
        let atoms = vec!["nope".to_string(), "2024-02-01/2024-02-29".to_string()];
        assert_eq!(
            DateInterval::first_valid(&atoms),
            DateInterval::new(date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(DateInterval::first_valid(&[]), None);
    }
}
