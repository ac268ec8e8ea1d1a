//! Daily series over dated rows.

use chrono::NaiveDate;
use market_core::Dated;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::change::pct_change;

/// One calendar day of a summed series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Day-over-day % change (0 on the first day and after a zero day)
    pub pct_change: f64,
    /// Running sum from the first day of the series
    pub cumulative: f64,
}

fn day_of<T: Dated>(row: &T) -> Option<NaiveDate> {
    row.timestamp().map(|ts| ts.date())
}

/// Latest calendar day present in `rows`
pub fn latest_date<T: Dated>(rows: &[T]) -> Option<NaiveDate> {
    rows.iter().filter_map(day_of).max()
}

/// Rows that fall on `date`
pub fn on_date<'a, T: Dated>(rows: &'a [T], date: NaiveDate) -> Vec<&'a T> {
    rows.iter().filter(|r| day_of(*r) == Some(date)).collect()
}

/// Per-day totals in ascending date order; undated rows are left out
pub fn daily_totals<T: Dated>(rows: &[T], value: impl Fn(&T) -> f64) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        if let Some(day) = day_of(row) {
            *days.entry(day).or_insert(0.0) += value(row);
        }
    }

    let points: Vec<DailyPoint> = days
        .into_iter()
        .map(|(date, value)| DailyPoint {
            date,
            value,
            pct_change: 0.0,
            cumulative: 0.0,
        })
        .collect();
    cumulative(with_pct_change(points))
}

/// Fill `pct_change` from each point's predecessor
pub fn with_pct_change(mut points: Vec<DailyPoint>) -> Vec<DailyPoint> {
    let mut prev: Option<f64> = None;
    for point in &mut points {
        point.pct_change = pct_change(point.value, prev);
        prev = Some(point.value);
    }
    points
}

/// Fill `cumulative` with the running sum; restarts with every new series
pub fn cumulative(mut points: Vec<DailyPoint>) -> Vec<DailyPoint> {
    let mut running = 0.0;
    for point in &mut points {
        running += point.value;
        point.cumulative = running;
    }
    points
}
