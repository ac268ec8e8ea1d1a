//! Market page: trading value, market cap and technical-signal views.

use analytics::{
    daily_totals, group_sum, latest_changes, latest_date, on_date, share_of_total, share_of_totals,
    top_k_per_group, top_n, DailyPoint, LatestChange, ShareRow,
};
use chrono::NaiveDate;
use data_loader::MarketData;
use market_core::{DateRange, MarketCapRecord, Section, SkipReason, TechnicalFlag, TradeRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use technical_analysis::compute_flags;

use crate::request::{ChartKind, DashboardRequest};

pub const TOP_TICKERS: usize = 15;
pub const TOP_INDUSTRIES: usize = 6;
pub const BUBBLES_PER_INDUSTRY: usize = 5;
pub const TOP_MARKET_CAP: usize = 10;
pub const TOP_FLAGGED: usize = 10;

/// A ranked key with its change against the previous trading day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChange {
    pub key: String,
    pub value: f64,
    pub pct_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedValue {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeStatus {
    Up,
    Down,
}

impl ChangeStatus {
    pub fn from_pct(pct: f64) -> Self {
        if pct >= 0.0 {
            ChangeStatus::Up
        } else {
            ChangeStatus::Down
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeStatus::Up => "Tăng",
            ChangeStatus::Down => "Giảm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubblePoint {
    pub industry: String,
    pub code: String,
    pub trade_value: f64,
    pub pct_change: f64,
    pub status: ChangeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryCount {
    pub industry: String,
    pub count: usize,
}

/// Everything the market page shows. Unrequested charts are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketBundle {
    pub range: DateRange,
    /// Latest trading date in the window
    pub latest_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_trade_value: Option<Section<Vec<DailyPoint>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_tickers: Option<Section<Vec<RankedChange>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_industries: Option<Section<Vec<RankedChange>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_bubbles: Option<Section<Vec<BubblePoint>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_strength: Option<Section<Vec<ShareRow<NaiveDate, String>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_market_cap: Option<Section<Vec<RankedValue>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_market_cap: Option<Section<Vec<ShareRow<NaiveDate, String>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_trend: Option<Section<Vec<DailyPoint>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_by_industry: Option<Section<Vec<IndustryCount>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma200_by_industry: Option<Section<Vec<IndustryCount>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_top_tickers: Option<Section<Vec<RankedValue>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma200_top_tickers: Option<Section<Vec<RankedValue>>>,
}

impl MarketBundle {
    /// Whether `chart` was requested and has data
    pub fn is_ready(&self, chart: ChartKind) -> bool {
        fn ready<T>(section: &Option<Section<T>>) -> bool {
            section.as_ref().is_some_and(Section::is_ready)
        }

        match chart {
            ChartKind::DailyTradeValue => ready(&self.daily_trade_value),
            ChartKind::TopTickers => ready(&self.top_tickers),
            ChartKind::TopIndustries => ready(&self.top_industries),
            ChartKind::IndustryBubbles => ready(&self.industry_bubbles),
            ChartKind::IndustryStrength => ready(&self.industry_strength),
            ChartKind::TopMarketCap => ready(&self.top_market_cap),
            ChartKind::IndustryMarketCap => ready(&self.industry_market_cap),
            ChartKind::MarketCapTrend => ready(&self.market_cap_trend),
            ChartKind::MacdByIndustry => ready(&self.macd_by_industry),
            ChartKind::Ma200ByIndustry => ready(&self.ma200_by_industry),
            ChartKind::MacdTopTickers => ready(&self.macd_top_tickers),
            ChartKind::Ma200TopTickers => ready(&self.ma200_top_tickers),
            _ => false,
        }
    }
}

/// Build `chart` only when requested, logging why a section was skipped
pub(crate) fn section<T>(
    request: &DashboardRequest,
    chart: ChartKind,
    build: impl FnOnce() -> Section<T>,
) -> Option<Section<T>> {
    if !request.wants(chart) {
        return None;
    }
    let result = build();
    if let Section::Skipped(reason) = &result {
        tracing::info!("{:?} skipped: {}", chart, reason.notice());
    }
    Some(result)
}

/// Build only when the input is available, otherwise skip for `reason`
fn require<T>(available: bool, reason: SkipReason, build: impl FnOnce() -> Section<T>) -> Section<T> {
    if available {
        build()
    } else {
        Section::Skipped(reason)
    }
}

fn rank_changes(changes: &[LatestChange<String>], n: usize) -> Vec<RankedChange> {
    let pct: HashMap<&str, f64> = changes.iter().map(|c| (c.key.as_str(), c.pct_change)).collect();
    let ranked = top_n(changes.iter().map(|c| (c.key.clone(), c.latest)).collect(), n);
    ranked
        .into_iter()
        .map(|(key, value)| RankedChange {
            pct_change: pct.get(key.as_str()).copied().unwrap_or(0.0),
            key,
            value,
        })
        .collect()
}

fn ranked_values(rows: Vec<(String, f64)>) -> Vec<RankedValue> {
    rows.into_iter().map(|(key, value)| RankedValue { key, value }).collect()
}

fn ticker_changes(trades: &[TradeRecord]) -> Vec<LatestChange<String>> {
    latest_changes(trades, |t| Some(t.code.clone()), |t| t.trade_value)
        .map(|(_, changes)| changes)
        .unwrap_or_default()
}

fn industry_bubbles(trades: &[TradeRecord], latest: NaiveDate, changes: &[LatestChange<String>]) -> Vec<BubblePoint> {
    let pct: HashMap<&str, f64> = changes.iter().map(|c| (c.key.as_str(), c.pct_change)).collect();
    let latest_rows = on_date(trades, latest);
    let by_pair = group_sum(
        &latest_rows,
        |t| t.industry.clone().map(|industry| (industry, t.code.clone())),
        |t| t.trade_value,
    );
    let rows = by_pair
        .into_iter()
        .map(|((industry, code), value)| (industry, code, value))
        .collect();

    top_k_per_group(rows, BUBBLES_PER_INDUSTRY)
        .into_iter()
        .map(|(industry, code, trade_value)| {
            let pct_change = pct.get(code.as_str()).copied().unwrap_or(0.0);
            BubblePoint {
                industry,
                code,
                trade_value,
                pct_change,
                status: ChangeStatus::from_pct(pct_change),
            }
        })
        .collect()
}

/// Each industry's share of the whole day's trading value, unclassified tickers included
fn industry_strength(trades: &[TradeRecord]) -> Vec<ShareRow<NaiveDate, String>> {
    let by_industry = group_sum(trades, |t| Some((t.date?, t.industry.clone()?)), |t| t.trade_value);
    let totals = group_sum(trades, |t| t.date, |t| t.trade_value);
    share_of_totals(
        by_industry
            .into_iter()
            .map(|((date, industry), value)| (date, industry, value))
            .collect(),
        totals,
    )
}

fn market_cap_views(
    caps: &[MarketCapRecord],
) -> Option<(Vec<RankedValue>, Vec<ShareRow<NaiveDate, String>>)> {
    let latest = latest_date(caps)?;
    let latest_rows = on_date(caps, latest);

    let by_code = group_sum(&latest_rows, |r| Some(r.code.clone()), |r| r.market_cap);
    let top = ranked_values(top_n(by_code, TOP_MARKET_CAP));

    let by_industry = group_sum(&latest_rows, |r| r.industry.clone(), |r| r.market_cap);
    let shares = share_of_total(
        by_industry
            .into_iter()
            .map(|(industry, value)| (latest, industry, value))
            .collect(),
    );
    Some((top, shares))
}

/// First industry seen for every ticker
fn industry_lookup(trades: &[TradeRecord]) -> HashMap<&str, &str> {
    let mut lookup = HashMap::new();
    for trade in trades {
        if let Some(industry) = trade.industry.as_deref() {
            lookup.entry(trade.code.as_str()).or_insert(industry);
        }
    }
    lookup
}

fn flagged_by_industry(flagged: &[&TechnicalFlag], industries: &HashMap<&str, &str>) -> Vec<IndustryCount> {
    group_sum(
        flagged,
        |f| industries.get(f.code.as_str()).map(|s| s.to_string()),
        |_| 1.0,
    )
    .into_iter()
    .map(|(industry, count)| IndustryCount {
        industry,
        count: count as usize,
    })
    .collect()
}

fn flagged_top(flagged: &[&TechnicalFlag], latest_trades: &[&TradeRecord]) -> Vec<RankedValue> {
    let codes: HashSet<&str> = flagged.iter().map(|f| f.code.as_str()).collect();
    let values = group_sum(
        latest_trades,
        |t| codes.contains(t.code.as_str()).then(|| t.code.clone()),
        |t| t.trade_value,
    );
    ranked_values(top_n(values, TOP_FLAGGED))
}

/// Compute the requested market views over `request.range`.
///
/// An empty trade window skips the whole page.
pub fn compute_market(data: &MarketData, request: &DashboardRequest) -> Section<MarketBundle> {
    let range = request.range;
    let trades = range.filter(&data.trades);
    let Some(latest) = latest_date(&trades) else {
        tracing::info!("No trades between {} and {}", range.start(), range.end());
        return Section::Skipped(SkipReason::NoData);
    };
    let caps = range.filter(&data.market_caps);
    let prices = range.filter(&data.prices);
    tracing::info!(
        "Market window {}..{}: {} trades, {} market caps, {} closes",
        range.start(),
        range.end(),
        trades.len(),
        caps.len(),
        prices.len()
    );

    let has_industry = data.has_industry;
    let changes = ticker_changes(&trades);

    let daily_trade_value = section(request, ChartKind::DailyTradeValue, || {
        Section::Ready(daily_totals(&trades, |t| t.trade_value))
    });
    let top_tickers = section(request, ChartKind::TopTickers, || {
        Section::Ready(rank_changes(&changes, TOP_TICKERS))
    });
    let top_industries = section(request, ChartKind::TopIndustries, || {
        require(has_industry, SkipReason::MissingIndustry, || {
            let industries = latest_changes(&trades, |t| t.industry.clone(), |t| t.trade_value)
                .map(|(_, changes)| changes)
                .unwrap_or_default();
            Section::Ready(rank_changes(&industries, TOP_INDUSTRIES))
        })
    });
    let industry_bubbles = section(request, ChartKind::IndustryBubbles, || {
        require(has_industry, SkipReason::MissingIndustry, || {
            Section::Ready(industry_bubbles(&trades, latest, &changes))
        })
    });
    let industry_strength = section(request, ChartKind::IndustryStrength, || {
        require(has_industry, SkipReason::MissingIndustry, || {
            Section::Ready(industry_strength(&trades))
        })
    });

    let cap_views = market_cap_views(&caps);
    if cap_views.is_none() {
        tracing::debug!("No market caps in the window");
    }
    let top_market_cap = section(request, ChartKind::TopMarketCap, || match &cap_views {
        Some((top, _)) => Section::Ready(top.clone()),
        None => Section::Skipped(SkipReason::NoData),
    });
    let industry_market_cap = section(request, ChartKind::IndustryMarketCap, || match &cap_views {
        Some(_) if !has_industry => Section::Skipped(SkipReason::MissingIndustry),
        Some((_, shares)) => Section::Ready(shares.clone()),
        None => Section::Skipped(SkipReason::NoData),
    });
    let market_cap_trend = section(request, ChartKind::MarketCapTrend, || {
        require(!caps.is_empty(), SkipReason::NoData, || {
            Section::Ready(daily_totals(&caps, |r| r.market_cap))
        })
    });

    let wants_flags = [
        ChartKind::MacdByIndustry,
        ChartKind::Ma200ByIndustry,
        ChartKind::MacdTopTickers,
        ChartKind::Ma200TopTickers,
    ]
    .iter()
    .any(|&c| request.wants(c));
    let flags = if wants_flags { compute_flags(&prices) } else { Vec::new() };
    let industries = industry_lookup(&data.trades);
    let macd: Vec<&TechnicalFlag> = flags.iter().filter(|f| f.macd_increasing).collect();
    let ma200: Vec<&TechnicalFlag> = flags.iter().filter(|f| f.ma200_increasing).collect();
    let close_latest = latest_date(&prices);
    let latest_trades = close_latest.map(|d| on_date(&trades, d)).unwrap_or_default();

    let has_closes = close_latest.is_some();
    let macd_by_industry = section(request, ChartKind::MacdByIndustry, || {
        require(has_closes, SkipReason::NoData, || {
            require(has_industry, SkipReason::MissingIndustry, || {
                Section::Ready(flagged_by_industry(&macd, &industries))
            })
        })
    });
    let ma200_by_industry = section(request, ChartKind::Ma200ByIndustry, || {
        require(has_closes, SkipReason::NoData, || {
            require(has_industry, SkipReason::MissingIndustry, || {
                Section::Ready(flagged_by_industry(&ma200, &industries))
            })
        })
    });
    let macd_top_tickers = section(request, ChartKind::MacdTopTickers, || {
        require(has_closes, SkipReason::NoData, || {
            Section::Ready(flagged_top(&macd, &latest_trades))
        })
    });
    let ma200_top_tickers = section(request, ChartKind::Ma200TopTickers, || {
        require(has_closes, SkipReason::NoData, || {
            Section::Ready(flagged_top(&ma200, &latest_trades))
        })
    });

    Section::Ready(MarketBundle {
        range,
        latest_date: latest,
        daily_trade_value,
        top_tickers,
        top_industries,
        industry_bubbles,
        industry_strength,
        top_market_cap,
        industry_market_cap,
        market_cap_trend,
        macd_by_industry,
        ma200_by_industry,
        macd_top_tickers,
        ma200_top_tickers,
    })
}
