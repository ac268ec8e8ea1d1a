use chrono::NaiveDate;
use data_loader::{DataCache, LoadResult, MarketData};
use market_core::{DateRange, Dated, InvestorFlowRecord, Section};
use serde::Serialize;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::detail::{compute_detail, DetailBundle};
use crate::export::ExportManifest;
use crate::market::{compute_market, MarketBundle};
use crate::overview::{compute_overview, OverviewBundle};
use crate::request::{ChartKind, DashboardRequest, DetailRequest, Page};

/// A computed page with the export plan for its ready charts
#[derive(Debug, Clone, Serialize)]
pub struct PageReport<B> {
    pub page: Page,
    pub charts: Vec<ChartKind>,
    pub bundle: Section<B>,
    /// `None` when the page itself was skipped
    pub manifest: Option<ExportManifest>,
}

impl<B> PageReport<B> {
    fn new(request: &DashboardRequest, bundle: Section<B>, is_ready: impl Fn(&B, ChartKind) -> bool) -> Self {
        let manifest = bundle
            .ready()
            .map(|b| ExportManifest::build(request.page, &request.charts, |chart| is_ready(b, chart)));
        Self {
            page: request.page,
            charts: request.charts.clone(),
            bundle,
            manifest,
        }
    }
}

fn date_span<T: Dated>(rows: &[T]) -> Option<(NaiveDate, NaiveDate)> {
    let mut days = rows.iter().filter_map(|r| r.timestamp()).map(|ts| ts.date());
    let first = days.next()?;
    Some(days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

fn merge_spans(spans: impl IntoIterator<Item = Option<(NaiveDate, NaiveDate)>>) -> Option<(NaiveDate, NaiveDate)> {
    spans
        .into_iter()
        .flatten()
        .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
}

/// Serves dashboard pages from memoized loads
pub struct DashboardSession {
    config: DashboardConfig,
    cache: DataCache,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = DataCache::new(config.chunk_size);
        Self { config, cache }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Number of memoized source loads held by the session
    pub fn cached_loads(&self) -> usize {
        self.cache.len()
    }

    fn market_data(&self, range: Option<DateRange>) -> LoadResult<Arc<MarketData>> {
        let bound = if self.config.bounded_loads { range } else { None };
        self.cache.market(&self.config.market_sources(), bound)
    }

    fn investor_flows(&self) -> LoadResult<Arc<Vec<InvestorFlowRecord>>> {
        self.cache.investor_flows(&self.config.investor_path)
    }

    /// First and last date across trades, market caps and closes
    pub fn market_date_span(&self) -> LoadResult<Option<(NaiveDate, NaiveDate)>> {
        let data = self.market_data(None)?;
        Ok(merge_spans([
            date_span(&data.trades),
            date_span(&data.market_caps),
            date_span(&data.prices),
        ]))
    }

    pub fn investor_date_span(&self) -> LoadResult<Option<(NaiveDate, NaiveDate)>> {
        Ok(date_span(self.investor_flows()?.as_slice()))
    }

    pub fn market(&self, request: &DashboardRequest) -> LoadResult<PageReport<MarketBundle>> {
        tracing::info!(
            "Building market page for {}..{} ({} charts)",
            request.range.start(),
            request.range.end(),
            request.charts.len()
        );
        let data = self.market_data(Some(request.range))?;
        let bundle = compute_market(&data, request);
        Ok(PageReport::new(request, bundle, MarketBundle::is_ready))
    }

    pub fn overview(&self, request: &DashboardRequest) -> LoadResult<PageReport<OverviewBundle>> {
        tracing::info!(
            "Building overview page for {}..{}",
            request.range.start(),
            request.range.end()
        );
        let rows = self.investor_flows()?;
        let bundle = compute_overview(&rows, request);
        Ok(PageReport::new(request, bundle, OverviewBundle::is_ready))
    }

    pub fn detail(&self, detail: &DetailRequest) -> LoadResult<PageReport<DetailBundle>> {
        tracing::info!(
            "Building detail page for {} over {}..{}",
            detail.column.header(),
            detail.request.range.start(),
            detail.request.range.end()
        );
        let rows = self.investor_flows()?;
        let bundle = compute_detail(&rows, detail);
        Ok(PageReport::new(&detail.request, bundle, DetailBundle::is_ready))
    }
}
