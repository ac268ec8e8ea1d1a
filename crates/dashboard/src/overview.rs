//! Investor overview page: net flows by industry and investor class.

use flow_map::{flow_statistics, industry_flows, melt_industry_flows, FlowStatistics, IndustryFlowBar};
use market_core::{DateRange, ExecutionType, InvestorFlowRecord, Section, SkipReason};
use serde::Serialize;

use crate::market::section;
use crate::request::{ChartKind, DashboardRequest};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewBundle {
    pub range: DateRange,
    /// Stacked bars for order-matched flows, industries by total descending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<Section<Vec<IndustryFlowBar>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiated: Option<Section<Vec<IndustryFlowBar>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_totals: Option<Section<FlowStatistics>>,
}

impl OverviewBundle {
    pub fn is_ready(&self, chart: ChartKind) -> bool {
        let section = match chart {
            ChartKind::MatchedFlows => self.matched.as_ref().map(Section::is_ready),
            ChartKind::NegotiatedFlows => self.negotiated.as_ref().map(Section::is_ready),
            ChartKind::FlowTotals => self.flow_totals.as_ref().map(Section::is_ready),
            _ => None,
        };
        section.unwrap_or(false)
    }
}

fn stacked_flows(rows: &[InvestorFlowRecord], execution: ExecutionType) -> Section<Vec<IndustryFlowBar>> {
    let flows = industry_flows(rows, execution);
    if flows.is_empty() {
        return Section::Skipped(SkipReason::MissingIndustry);
    }
    Section::Ready(melt_industry_flows(&flows))
}

/// Overview of the investor-flow rows inside `request.range`.
///
/// Rows with unparseable dates never fall inside a range.
pub fn compute_overview(rows: &[InvestorFlowRecord], request: &DashboardRequest) -> Section<OverviewBundle> {
    let range = request.range;
    let filtered = range.filter(rows);
    if filtered.is_empty() {
        tracing::info!("No investor flows between {} and {}", range.start(), range.end());
        return Section::Skipped(SkipReason::NoData);
    }
    tracing::info!("Overview window has {} investor-flow rows", filtered.len());

    Section::Ready(OverviewBundle {
        range,
        matched: section(request, ChartKind::MatchedFlows, || {
            stacked_flows(&filtered, ExecutionType::Matched)
        }),
        negotiated: section(request, ChartKind::NegotiatedFlows, || {
            stacked_flows(&filtered, ExecutionType::Negotiated)
        }),
        flow_totals: section(request, ChartKind::FlowTotals, || {
            Section::Ready(flow_statistics(&filtered))
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Page;
    use chrono::NaiveDate;
    use market_core::{FlowColumn, InvestorClass};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn record(d: u32, industry: Option<&str>, column: FlowColumn, value: f64) -> InvestorFlowRecord {
        let mut net = [0.0; FlowColumn::COUNT];
        net[column.index()] = value;
        InvestorFlowRecord {
            date: day(d).and_hms_opt(15, 0, 0),
            industry: industry.map(str::to_string),
            net,
        }
    }

    fn foreign(execution: ExecutionType) -> FlowColumn {
        FlowColumn::new(InvestorClass::Foreign, execution)
    }

    fn request(start: u32, end: u32) -> DashboardRequest {
        DashboardRequest::new(Page::Overview, day(start), day(end)).unwrap()
    }

    #[test]
    fn test_overview_of_window() {
        let rows = vec![
            record(1, Some("Ngân hàng"), foreign(ExecutionType::Matched), 5.0),
            record(2, Some("Thép"), foreign(ExecutionType::Matched), 8.0),
            record(2, Some("Thép"), foreign(ExecutionType::Negotiated), -3.0),
            record(9, Some("Ngân hàng"), foreign(ExecutionType::Matched), 100.0),
        ];
        let bundle = compute_overview(&rows, &request(1, 2));
        let bundle = bundle.ready().unwrap();

        let matched = bundle.matched.as_ref().and_then(Section::ready).unwrap();
        assert_eq!(matched.len(), 8);
        assert_eq!(matched[0].industry, "Thép");

        let stats = bundle.flow_totals.as_ref().and_then(Section::ready).unwrap();
        assert_eq!(stats.industry_count, 2);
        assert_eq!(stats.totals[1].matched, 13.0);
        assert_eq!(stats.totals[1].negotiated, -3.0);
        assert_eq!(stats.totals[1].direction, flow_map::FlowDirection::Inflow);

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["totals"][1]["direction"], "inflow");
        assert_eq!(json["totals"][0]["direction"], "neutral");
    }

    #[test]
    fn test_intraday_rows_on_end_day_are_kept() {
        let rows = vec![record(3, Some("Thép"), foreign(ExecutionType::Matched), 1.0)];
        let bundle = compute_overview(&rows, &request(3, 3));
        assert!(bundle.is_ready());
    }

    #[test]
    fn test_empty_window_and_missing_industry() {
        let rows = vec![record(3, None, foreign(ExecutionType::Matched), 1.0)];
        assert_eq!(compute_overview(&rows, &request(4, 5)), Section::Skipped(SkipReason::NoData));

        let bundle = compute_overview(&rows, &request(1, 5));
        let bundle = bundle.ready().unwrap();
        assert_eq!(bundle.matched, Some(Section::Skipped(SkipReason::MissingIndustry)));
        assert!(bundle.is_ready(ChartKind::FlowTotals));
        assert!(!bundle.is_ready(ChartKind::MatchedFlows));
    }
}
