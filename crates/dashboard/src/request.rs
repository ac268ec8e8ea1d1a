//! What a caller asks the dashboard for.

use chrono::NaiveDate;
use clap::ValueEnum;
use market_core::{DateRange, FlowColumn, MarketError};
use serde::{Deserialize, Serialize};

/// Dashboard pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Market,
    Overview,
    Detail,
}

/// Every chart the dashboards can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    DailyTradeValue,
    TopTickers,
    TopIndustries,
    IndustryBubbles,
    IndustryStrength,
    TopMarketCap,
    IndustryMarketCap,
    MarketCapTrend,
    MacdByIndustry,
    Ma200ByIndustry,
    MacdTopTickers,
    Ma200TopTickers,
    MatchedFlows,
    NegotiatedFlows,
    FlowTotals,
    ColumnByIndustry,
    ColumnDaily,
}

impl ChartKind {
    pub const MARKET: [ChartKind; 12] = [
        ChartKind::DailyTradeValue,
        ChartKind::TopTickers,
        ChartKind::TopIndustries,
        ChartKind::IndustryBubbles,
        ChartKind::IndustryStrength,
        ChartKind::TopMarketCap,
        ChartKind::IndustryMarketCap,
        ChartKind::MarketCapTrend,
        ChartKind::MacdByIndustry,
        ChartKind::Ma200ByIndustry,
        ChartKind::MacdTopTickers,
        ChartKind::Ma200TopTickers,
    ];

    pub const OVERVIEW: [ChartKind; 3] = [
        ChartKind::MatchedFlows,
        ChartKind::NegotiatedFlows,
        ChartKind::FlowTotals,
    ];

    pub const DETAIL: [ChartKind; 2] = [ChartKind::ColumnByIndustry, ChartKind::ColumnDaily];

    pub fn page(&self) -> Page {
        match self {
            ChartKind::MatchedFlows | ChartKind::NegotiatedFlows | ChartKind::FlowTotals => Page::Overview,
            ChartKind::ColumnByIndustry | ChartKind::ColumnDaily => Page::Detail,
            _ => Page::Market,
        }
    }

    /// Chart heading as shown on the dashboard
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::DailyTradeValue => "GTGD(B) & % thay đổi theo ngày",
            ChartKind::TopTickers => "Top 15 cổ phiếu (ngày mới nhất)",
            ChartKind::TopIndustries => "Top 6 ngành (ngày mới nhất)",
            ChartKind::IndustryBubbles => "Bubble Chart theo nhóm ngành",
            ChartKind::IndustryStrength => "Sức mạnh ngành theo thời gian",
            ChartKind::TopMarketCap => "Top 10 cổ phiếu theo vốn hóa (ngày mới nhất)",
            ChartKind::IndustryMarketCap => "Tỷ trọng vốn hóa theo ngành (ngày mới nhất)",
            ChartKind::MarketCapTrend => "Xu hướng vốn hóa thị trường theo thời gian",
            ChartKind::MacdByIndustry => "Số lượng cổ phiếu theo ngành có MACD tăng",
            ChartKind::Ma200ByIndustry => "Số lượng cổ phiếu theo ngành có MA200 tăng",
            ChartKind::MacdTopTickers => "Top 10 cổ phiếu có MACD tăng",
            ChartKind::Ma200TopTickers => "Top 10 cổ phiếu có MA200 tăng",
            ChartKind::MatchedFlows => "Giao dịch Khớp Ròng theo ngành và nhà đầu tư",
            ChartKind::NegotiatedFlows => "Giao dịch Thỏa thuận Ròng theo ngành và nhà đầu tư",
            ChartKind::FlowTotals => "Thống kê dòng tiền theo nhà đầu tư",
            ChartKind::ColumnByIndustry => "Giao dịch ròng theo ngành",
            ChartKind::ColumnDaily => "Giao dịch ròng theo thời gian và tích lũy ròng",
        }
    }
}

impl Page {
    /// Charts of this page in display order
    pub fn charts(&self) -> &'static [ChartKind] {
        match self {
            Page::Market => &ChartKind::MARKET,
            Page::Overview => &ChartKind::OVERVIEW,
            Page::Detail => &ChartKind::DETAIL,
        }
    }
}

/// A date window plus the charts to compute for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRequest {
    pub page: Page,
    pub range: DateRange,
    /// Selected charts, in page display order
    pub charts: Vec<ChartKind>,
}

impl DashboardRequest {
    /// All charts of `page` over `[start, end]`
    pub fn new(page: Page, start: NaiveDate, end: NaiveDate) -> Result<Self, MarketError> {
        Ok(Self {
            page,
            range: DateRange::new(start, end)?,
            charts: page.charts().to_vec(),
        })
    }

    /// Restrict to `selected`. Charts of other pages are ignored and an empty
    /// selection keeps every chart of the page.
    pub fn with_charts(mut self, selected: &[ChartKind]) -> Self {
        let picked: Vec<ChartKind> = self
            .page
            .charts()
            .iter()
            .copied()
            .filter(|c| selected.contains(c))
            .collect();
        for chart in selected.iter().filter(|c| c.page() != self.page) {
            tracing::warn!("Chart {:?} does not belong to the {:?} page, ignoring", chart, self.page);
        }
        if !selected.is_empty() {
            self.charts = picked;
        }
        self
    }

    pub fn wants(&self, chart: ChartKind) -> bool {
        self.charts.contains(&chart)
    }
}

/// Detail-page request: one investor flow column over a window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRequest {
    pub request: DashboardRequest,
    pub column: FlowColumn,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_start_after_end_is_rejected() {
        let err = DashboardRequest::new(Page::Market, day(5), day(1)).unwrap_err();
        assert!(matches!(err, MarketError::InvalidRange { .. }));
    }

    #[test]
    fn test_selection_keeps_page_order() {
        let request = DashboardRequest::new(Page::Market, day(1), day(5))
            .unwrap()
            .with_charts(&[ChartKind::MarketCapTrend, ChartKind::DailyTradeValue, ChartKind::FlowTotals]);

        assert_eq!(request.charts, vec![ChartKind::DailyTradeValue, ChartKind::MarketCapTrend]);
        assert!(request.wants(ChartKind::DailyTradeValue));
        assert!(!request.wants(ChartKind::FlowTotals));
    }

    #[test]
    fn test_empty_selection_keeps_all() {
        let request = DashboardRequest::new(Page::Overview, day(1), day(1))
            .unwrap()
            .with_charts(&[]);
        assert_eq!(request.charts, ChartKind::OVERVIEW.to_vec());
    }

    #[test]
    fn test_chart_pages() {
        assert!(ChartKind::MARKET.iter().all(|c| c.page() == Page::Market));
        assert!(ChartKind::OVERVIEW.iter().all(|c| c.page() == Page::Overview));
        assert!(ChartKind::DETAIL.iter().all(|c| c.page() == Page::Detail));
    }
}
