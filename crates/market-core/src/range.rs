//! Inclusive whole-day date ranges.
//!
//! A range `[start, end]` admits every timestamp from `start 00:00:00` up to
//! and including `end 23:59:59.999999`, so intraday timestamps on the end day
//! are never dropped. Rows without a valid date never match.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Dated, MarketError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, MarketError> {
        if start > end {
            return Err(MarketError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Midnight at the start of the first day
    pub fn lower_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last microsecond of the final day
    pub fn upper_bound(&self) -> NaiveDateTime {
        self.end
            .and_hms_micro_opt(23, 59, 59, 999_999)
            .unwrap_or_else(|| self.end.and_time(NaiveTime::MIN))
    }

    pub fn contains_timestamp(&self, ts: NaiveDateTime) -> bool {
        ts >= self.lower_bound() && ts <= self.upper_bound()
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn contains<T: Dated>(&self, row: &T) -> bool {
        row.timestamp()
            .map_or(false, |ts| self.contains_timestamp(ts))
    }

    /// Rows inside the range, in source order. The source is left untouched.
    pub fn filter<T: Dated + Clone>(&self, rows: &[T]) -> Vec<T> {
        rows.iter().filter(|r| self.contains(*r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Observation;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(date: Option<NaiveDate>) -> Observation {
        Observation {
            name: "Vingroup".to_string(),
            code: "VIC".to_string(),
            date,
            value: Some(1.0),
        }
    }

    #[test]
    fn test_rejects_start_after_end() {
        let err = DateRange::new(day(2024, 1, 2), day(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, MarketError::InvalidRange { .. }));
    }

    #[test]
    fn test_filter_includes_both_endpoints() {
        let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 2)).unwrap();
        let rows: Vec<Observation> = [
            day(2023, 12, 31),
            day(2024, 1, 1),
            day(2024, 1, 2),
            day(2024, 1, 3),
        ]
        .into_iter()
        .map(|d| obs(Some(d)))
        .collect();

        let kept = range.filter(&rows);
        let dates: Vec<NaiveDate> = kept.iter().filter_map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 1), day(2024, 1, 2)]);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_end_day_intraday_timestamps_are_inside() {
        let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 2)).unwrap();
        let late = day(2024, 1, 2).and_hms_opt(23, 59, 59).unwrap();
        let next = day(2024, 1, 3).and_time(NaiveTime::MIN);

        assert!(range.contains_timestamp(late));
        assert!(!range.contains_timestamp(next));
    }

    #[test]
    fn test_invalid_dates_never_match() {
        let range = DateRange::new(day(2000, 1, 1), day(2100, 1, 1)).unwrap();
        assert!(!range.contains(&obs(None)));
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let range = DateRange::new(day(2025, 1, 1), day(2025, 1, 31)).unwrap();
        let rows = vec![obs(Some(day(2024, 1, 1)))];
        assert!(range.filter(&rows).is_empty());
    }
}
