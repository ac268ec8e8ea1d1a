//! Market-wide flow totals and single-column drill-downs.

use analytics::{daily_totals, group_sum, DailyPoint};
use market_core::{ExecutionType, FlowColumn, InvestorClass, InvestorFlowRecord};
use serde::Serialize;
use std::collections::BTreeSet;

/// Direction of net flow for an investor class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    Inflow,
    Outflow,
    Neutral,
}

impl FlowDirection {
    pub fn of(net: f64) -> Self {
        if net > 0.0 {
            FlowDirection::Inflow
        } else if net < 0.0 {
            FlowDirection::Outflow
        } else {
            FlowDirection::Neutral
        }
    }
}

/// Net flow of one investor class over the whole window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassFlowTotal {
    pub class: InvestorClass,
    pub matched: f64,
    pub negotiated: f64,
    pub total: f64,
    /// Sign of `total`
    pub direction: FlowDirection,
}

/// Headline numbers for the overview page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowStatistics {
    /// Distinct non-null industries in the window
    pub industry_count: usize,
    pub totals: Vec<ClassFlowTotal>,
}

fn column_sum(rows: &[InvestorFlowRecord], column: FlowColumn) -> f64 {
    rows.iter().map(|r| r.net(column)).sum()
}

/// Matched, negotiated and combined net flow per class, in `InvestorClass::ALL` order
pub fn flow_totals(rows: &[InvestorFlowRecord]) -> Vec<ClassFlowTotal> {
    InvestorClass::ALL
        .iter()
        .map(|&class| {
            let matched = column_sum(rows, FlowColumn::new(class, ExecutionType::Matched));
            let negotiated = column_sum(rows, FlowColumn::new(class, ExecutionType::Negotiated));
            let total = matched + negotiated;
            ClassFlowTotal {
                class,
                matched,
                negotiated,
                total,
                direction: FlowDirection::of(total),
            }
        })
        .collect()
}

pub fn flow_statistics(rows: &[InvestorFlowRecord]) -> FlowStatistics {
    let industries: BTreeSet<&str> = rows.iter().filter_map(|r| r.industry.as_deref()).collect();
    FlowStatistics {
        industry_count: industries.len(),
        totals: flow_totals(rows),
    }
}

/// One column summed per industry, smallest first
pub fn column_by_industry(rows: &[InvestorFlowRecord], column: FlowColumn) -> Vec<(String, f64)> {
    let mut sums = group_sum(rows, |r| r.industry.clone(), |r| r.net(column));
    sums.sort_by(|a, b| a.1.total_cmp(&b.1));
    sums
}

/// Daily net flow of one column with its running total over the window
pub fn column_daily_series(rows: &[InvestorFlowRecord], column: FlowColumn) -> Vec<DailyPoint> {
    let series = daily_totals(rows, |r| r.net(column));
    tracing::debug!("{}: {} daily points", column.header(), series.len());
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32, industry: &str, column: FlowColumn, value: f64) -> InvestorFlowRecord {
        let mut net = [0.0; FlowColumn::COUNT];
        net[column.index()] = value;
        InvestorFlowRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).and_then(|d| d.and_hms_opt(0, 0, 0)),
            industry: Some(industry.to_string()),
            net,
        }
    }

    fn foreign_matched() -> FlowColumn {
        FlowColumn::new(InvestorClass::Foreign, ExecutionType::Matched)
    }

    #[test]
    fn test_flow_totals_per_class() {
        let rows = vec![
            record(1, "Banks", foreign_matched(), 10.0),
            record(1, "Steel", FlowColumn::new(InvestorClass::Foreign, ExecutionType::Negotiated), -4.0),
            record(2, "Banks", FlowColumn::new(InvestorClass::Individual, ExecutionType::Matched), -3.0),
        ];
        let totals = flow_totals(&rows);

        assert_eq!(totals[0].class, InvestorClass::Individual);
        assert_eq!(totals[0].direction, FlowDirection::Outflow);
        assert_eq!(totals[1].matched, 10.0);
        assert_eq!(totals[1].negotiated, -4.0);
        assert_eq!(totals[1].total, 6.0);
        assert_eq!(totals[1].direction, FlowDirection::Inflow);
        assert_eq!(totals[3].direction, FlowDirection::Neutral);

        assert_eq!(flow_statistics(&rows).industry_count, 2);
    }

    #[test]
    fn test_column_by_industry_ascending() {
        let rows = vec![
            record(1, "Banks", foreign_matched(), 10.0),
            record(1, "Steel", foreign_matched(), -5.0),
            record(2, "Banks", foreign_matched(), 1.0),
        ];
        let sums = column_by_industry(&rows, foreign_matched());
        assert_eq!(sums, vec![("Steel".to_string(), -5.0), ("Banks".to_string(), 11.0)]);
    }

    #[test]
    fn test_cumulative_restarts_per_window() {
        let rows = vec![
            record(1, "Banks", foreign_matched(), 10.0),
            record(2, "Banks", foreign_matched(), -4.0),
            record(3, "Steel", foreign_matched(), 1.0),
        ];
        let full = column_daily_series(&rows, foreign_matched());
        let running: Vec<f64> = full.iter().map(|p| p.cumulative).collect();
        assert_eq!(running, vec![10.0, 6.0, 7.0]);

        let window = column_daily_series(&rows[1..], foreign_matched());
        assert_eq!(window[0].cumulative, -4.0);
    }
}
