//! Group-by rollups, rankings and share-of-total.
//!
//! Rollups return groups in ascending key order. Rows whose key is `None`
//! (e.g. unclassified tickers when grouping by industry) are left out.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sum `N` numeric columns per key
pub fn group_sum_columns<T, K, const N: usize>(
    rows: &[T],
    key: impl Fn(&T) -> Option<K>,
    values: impl Fn(&T) -> [f64; N],
) -> Vec<(K, [f64; N])>
where
    K: Ord,
{
    let mut groups: BTreeMap<K, [f64; N]> = BTreeMap::new();
    for row in rows {
        let Some(k) = key(row) else {
            continue;
        };
        let sums = groups.entry(k).or_insert([0.0; N]);
        for (sum, v) in sums.iter_mut().zip(values(row)) {
            *sum += v;
        }
    }
    groups.into_iter().collect()
}

/// Sum one numeric column per key
pub fn group_sum<T, K>(
    rows: &[T],
    key: impl Fn(&T) -> Option<K>,
    value: impl Fn(&T) -> f64,
) -> Vec<(K, f64)>
where
    K: Ord,
{
    group_sum_columns(rows, key, |r| [value(r)])
        .into_iter()
        .map(|(k, [v])| (k, v))
        .collect()
}

fn rank_desc<K: Ord>(a: &(K, f64), b: &(K, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// The `n` largest values, descending; ties go to the smaller key. NaN values never rank.
pub fn top_n<K: Ord>(rows: Vec<(K, f64)>, n: usize) -> Vec<(K, f64)> {
    let mut ranked: Vec<(K, f64)> = rows.into_iter().filter(|(_, v)| !v.is_nan()).collect();
    ranked.sort_by(rank_desc);
    ranked.truncate(n);
    ranked
}

/// Top `k` members of every group, concatenated in group order then rank order
pub fn top_k_per_group<G, K>(rows: Vec<(G, K, f64)>, k: usize) -> Vec<(G, K, f64)>
where
    G: Ord + Clone,
    K: Ord,
{
    let mut groups: BTreeMap<G, Vec<(K, f64)>> = BTreeMap::new();
    for (group, key, value) in rows {
        groups.entry(group).or_default().push((key, value));
    }

    groups
        .into_iter()
        .flat_map(|(group, members)| {
            top_n(members, k)
                .into_iter()
                .map(move |(key, value)| (group.clone(), key, value))
        })
        .collect()
}

/// One row's portion of its partition total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow<P, G> {
    pub partition: P,
    pub group: G,
    pub value: f64,
    pub total: f64,
    /// `None` when the partition total is zero: the share is undefined
    pub share: Option<f64>,
}

/// Divide each (partition, group) value by the partition total.
///
/// Totals come from a separate rollup over the same rows; output keeps the
/// input order.
pub fn share_of_total<P, G>(rows: Vec<(P, G, f64)>) -> Vec<ShareRow<P, G>>
where
    P: Ord + Clone + std::fmt::Debug,
{
    let mut totals: BTreeMap<P, f64> = BTreeMap::new();
    for (partition, _, value) in &rows {
        *totals.entry(partition.clone()).or_insert(0.0) += value;
    }
    divide_by_totals(rows, &totals)
}

/// Like `share_of_total`, against totals rolled up from a wider table
/// (e.g. every ticker of the day, classified or not). Partitions missing from
/// `totals` count as zero.
pub fn share_of_totals<P, G>(rows: Vec<(P, G, f64)>, totals: Vec<(P, f64)>) -> Vec<ShareRow<P, G>>
where
    P: Ord + Clone + std::fmt::Debug,
{
    let totals: BTreeMap<P, f64> = totals.into_iter().collect();
    divide_by_totals(rows, &totals)
}

fn divide_by_totals<P, G>(rows: Vec<(P, G, f64)>, totals: &BTreeMap<P, f64>) -> Vec<ShareRow<P, G>>
where
    P: Ord + std::fmt::Debug,
{
    rows.into_iter()
        .map(|(partition, group, value)| {
            let total = totals.get(&partition).copied().unwrap_or(0.0);
            let share = if total == 0.0 {
                tracing::warn!("Zero total for {:?}, share left undefined", partition);
                None
            } else {
                Some(value / total)
            };
            ShareRow {
                partition,
                group,
                value,
                total,
                share,
            }
        })
        .collect()
}
