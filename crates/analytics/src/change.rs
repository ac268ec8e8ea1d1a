//! Percent change against the latest prior trading day.

use chrono::NaiveDate;
use market_core::Dated;
use serde::Serialize;
use std::collections::BTreeMap;

/// `(latest - prev) / prev * 100`, or 0 when there is no previous value or it is zero
pub fn pct_change(latest: f64, prev: Option<f64>) -> f64 {
    match prev {
        Some(p) if p != 0.0 => (latest - p) / p * 100.0,
        _ => 0.0,
    }
}

/// A key's value on the latest date and its change since its own previous date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestChange<K> {
    pub key: K,
    pub latest: f64,
    pub pct_change: f64,
}

/// Compare every key's total on the latest date with its most recent earlier date.
///
/// The latest date `D` is the maximum over all rows. Only keys with data on
/// `D` are reported. Days without data for a key are skipped, so the
/// comparison is against that key's last trading day, not a fixed lag.
/// Returns `None` when no row carries a date.
pub fn latest_changes<T, K>(
    rows: &[T],
    key: impl Fn(&T) -> Option<K>,
    value: impl Fn(&T) -> f64,
) -> Option<(NaiveDate, Vec<LatestChange<K>>)>
where
    T: Dated,
    K: Ord,
{
    let mut by_key: BTreeMap<K, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    let mut latest: Option<NaiveDate> = None;

    for row in rows {
        let Some(day) = row.timestamp().map(|ts| ts.date()) else {
            continue;
        };
        latest = latest.max(Some(day));
        if let Some(k) = key(row) {
            *by_key.entry(k).or_default().entry(day).or_insert(0.0) += value(row);
        }
    }

    let latest = latest?;
    let changes = by_key
        .into_iter()
        .filter_map(|(k, days)| {
            let current = *days.get(&latest)?;
            let prev = days.range(..latest).next_back().map(|(_, v)| *v);
            Some(LatestChange {
                key: k,
                latest: current,
                pct_change: pct_change(current, prev),
            })
        })
        .collect();

    Some((latest, changes))
}
