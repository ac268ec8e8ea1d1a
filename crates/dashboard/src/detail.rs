//! Investor detail page: one net-flow column, by industry and over time.

use analytics::DailyPoint;
use flow_map::{column_by_industry, column_daily_series};
use market_core::{DateRange, FlowColumn, InvestorFlowRecord, Section, SkipReason};
use serde::Serialize;

use crate::market::section;
use crate::request::{ChartKind, DetailRequest};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryValue {
    pub industry: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailStatistics {
    pub industry_count: usize,
    /// Column total over the window
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailBundle {
    pub range: DateRange,
    pub column: FlowColumn,
    /// Source header of the column, e.g. "Nước ngoài Khớp Ròng"
    pub header: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_industry: Option<Section<Vec<IndustryValue>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<Section<Vec<DailyPoint>>>,
    pub statistics: DetailStatistics,
}

impl DetailBundle {
    pub fn is_ready(&self, chart: ChartKind) -> bool {
        let section = match chart {
            ChartKind::ColumnByIndustry => self.by_industry.as_ref().map(Section::is_ready),
            ChartKind::ColumnDaily => self.daily.as_ref().map(Section::is_ready),
            _ => None,
        };
        section.unwrap_or(false)
    }
}

pub fn compute_detail(rows: &[InvestorFlowRecord], detail: &DetailRequest) -> Section<DetailBundle> {
    let request = &detail.request;
    let column = detail.column;
    let range = request.range;
    let filtered = range.filter(rows);
    if filtered.is_empty() {
        tracing::info!("No investor flows between {} and {}", range.start(), range.end());
        return Section::Skipped(SkipReason::NoData);
    }

    let sums = column_by_industry(&filtered, column);
    let statistics = DetailStatistics {
        industry_count: sums.len(),
        total: filtered.iter().map(|r| r.net(column)).sum(),
    };
    tracing::info!(
        "{}: {} industries, total {:.0}",
        column.header(),
        statistics.industry_count,
        statistics.total
    );

    let by_industry = section(request, ChartKind::ColumnByIndustry, || {
        if sums.is_empty() {
            return Section::Skipped(SkipReason::MissingIndustry);
        }
        Section::Ready(
            sums.iter()
                .map(|(industry, value)| IndustryValue {
                    industry: industry.clone(),
                    value: *value,
                })
                .collect(),
        )
    });
    let daily = section(request, ChartKind::ColumnDaily, || {
        Section::Ready(column_daily_series(&filtered, column))
    });

    Section::Ready(DetailBundle {
        range,
        column,
        header: column.header(),
        by_industry,
        daily,
        statistics,
    })
}
