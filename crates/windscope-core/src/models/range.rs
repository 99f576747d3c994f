//! Calendar date ranges and archive day keys

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Input format for query dates
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Day format embedded in archive names and payload timestamps
pub const ARCHIVE_DAY_FORMAT: &str = "%d.%m.%Y";

/// Latest minute of a day covered by time-series queries
const LAST_MINUTE: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Inclusive range of calendar days
///
/// An inverted range (end before start) is representable and simply covers
/// no days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range covering a single day
    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// Parse `YYYY-MM-DD` inputs
    pub fn parse(from: &str, to: &str) -> QueryResult<Self> {
        Ok(Self::new(parse_query_date(from)?, parse_query_date(to)?))
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Every day in the range, ascending; empty when inverted
    pub fn days(&self) -> Vec<NaiveDate> {
        if self.is_empty() {
            return Vec::new();
        }
        std::iter::successors(Some(self.start), |d| d.succ_opt())
            .take_while(|d| *d <= self.end)
            .collect()
    }

    /// First instant covered by time-series queries (start of day)
    pub fn first_instant(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last instant covered by time-series queries (23:59 on the end day)
    pub fn last_instant(&self) -> NaiveDateTime {
        self.end.and_time(LAST_MINUTE)
    }

    /// Whether a measurement timestamp falls inside the inclusive instant range
    pub fn contains_instant(&self, instant: NaiveDateTime) -> bool {
        instant >= self.first_instant() && instant <= self.last_instant()
    }
}

/// Parse a single `YYYY-MM-DD` date
pub fn parse_query_date(value: &str) -> QueryResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), QUERY_DATE_FORMAT)
        .map_err(|_| QueryError::InvalidDate(value.to_string()))
}

/// Format a day the way archive names embed it (`DD.MM.YYYY`)
pub fn archive_day(day: NaiveDate) -> String {
    day.format(ARCHIVE_DAY_FORMAT).to_string()
}

/// Format a day the way query results key it (`YYYY-MM-DD`)
pub fn query_day(day: NaiveDate) -> String {
    day.format(QUERY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_inclusive_and_ascending() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 2));
        let days = range.days();
        // 2024 is a leap year: 27, 28, 29 Feb, 1, 2 Mar
        assert_eq!(days.len(), 5);
        assert_eq!(days.first(), Some(&date(2024, 2, 27)));
        assert_eq!(days.last(), Some(&date(2024, 3, 2)));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_day_count_matches_difference() {
        let start = date(2023, 12, 30);
        for extra in 0..40 {
            let end = start + Duration::days(extra);
            assert_eq!(DateRange::new(start, end).days().len() as i64, extra + 1);
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = DateRange::new(date(2024, 1, 5), date(2024, 1, 4));
        assert!(range.is_empty());
        assert!(range.days().is_empty());
    }

    #[test]
    fn test_instant_bounds() {
        let range = DateRange::single(date(2024, 1, 5));
        let at = |h, m| date(2024, 1, 5).and_hms_opt(h, m, 0).unwrap();
        assert!(range.contains_instant(at(0, 0)));
        assert!(range.contains_instant(at(23, 59)));
        assert!(!range.contains_instant(date(2024, 1, 6).and_hms_opt(0, 0, 0).unwrap()));
        assert!(!range.contains_instant(date(2024, 1, 4).and_hms_opt(23, 59, 0).unwrap()));
    }

    #[test]
    fn test_instant_bounds_at_calendar_edges() {
        let range = DateRange::new(NaiveDate::MIN, NaiveDate::MAX);
        assert_eq!(range.first_instant(), NaiveDate::MIN.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(range.last_instant(), NaiveDate::MAX.and_hms_opt(23, 59, 0).unwrap());
        assert!(range.contains_instant(NaiveDate::MAX.and_hms_opt(23, 59, 0).unwrap()));
        assert_eq!(DateRange::single(NaiveDate::MAX).days(), vec![NaiveDate::MAX]);
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(DateRange::parse("2024-01-05", "2024-01-06").is_ok());
        assert!(matches!(
            DateRange::parse("05.01.2024", "2024-01-06"),
            Err(QueryError::InvalidDate(_))
        ));
        assert!(parse_query_date("2024-02-30").is_err());
    }

    #[test]
    fn test_day_formats() {
        assert_eq!(archive_day(date(2024, 1, 5)), "05.01.2024");
        assert_eq!(query_day(date(2024, 1, 5)), "2024-01-05");
    }
}
