//! Joins the reshaped value streams into the tables the dashboards consume.

use chrono::NaiveDate;
use market_core::{MarketCapRecord, Metric, Observation, ObservationTable, TradeRecord};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::LoadResult;
use crate::reshape::{read_wide, ReshapeOptions};
use crate::sector::SectorTable;

/// TradeValue is reported in billions
pub const TRADE_VALUE_SCALE: f64 = 1e9;

/// File locations for one market dashboard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketSources {
    pub volume: PathBuf,
    pub price: PathBuf,
    /// Not every dashboard variant ships a market-cap table
    pub market_cap: Option<PathBuf>,
    pub sector: PathBuf,
}

/// Everything the market page reads, prepared once per load key
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub trades: Vec<TradeRecord>,
    pub market_caps: Vec<MarketCapRecord>,
    /// Close prices without sector info, used for technical flags
    pub prices: Vec<Observation>,
    /// Whether the sector join produced an Industry column
    pub has_industry: bool,
}

/// Inner join of Close and Volume on (Date, Code), left join on sector.
///
/// Rows are emitted in price-table order. Rows whose TradeValue cannot be
/// computed (missing Close or Volume) are dropped.
pub fn build_trade_table(
    prices: &ObservationTable,
    volumes: &ObservationTable,
    sectors: &SectorTable,
) -> Vec<TradeRecord> {
    let mut by_key: HashMap<(Option<NaiveDate>, &str), Vec<Option<f64>>> = HashMap::new();
    for obs in &volumes.rows {
        by_key
            .entry((obs.date, obs.code.as_str()))
            .or_default()
            .push(obs.value);
    }

    let mut trades = Vec::with_capacity(prices.len());
    let mut dropped = 0usize;
    for price in &prices.rows {
        let Some(matches) = by_key.get(&(price.date, price.code.as_str())) else {
            continue;
        };
        for volume in matches {
            let (Some(close), Some(volume)) = (price.value, *volume) else {
                dropped += 1;
                continue;
            };
            let trade_value = close * volume / TRADE_VALUE_SCALE;
            if trade_value.is_nan() {
                dropped += 1;
                continue;
            }
            trades.push(TradeRecord {
                date: price.date,
                code: price.code.clone(),
                name: price.name.clone(),
                close,
                volume,
                trade_value,
                industry: sectors.industry_of(&price.code).map(str::to_string),
            });
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} joined rows without a computable TradeValue", dropped);
    }
    trades
}

/// Market caps with the sector attached; rows without a value are dropped
pub fn build_market_cap_table(caps: &ObservationTable, sectors: &SectorTable) -> Vec<MarketCapRecord> {
    caps.rows
        .iter()
        .filter_map(|obs| {
            obs.value.map(|market_cap| MarketCapRecord {
                date: obs.date,
                code: obs.code.clone(),
                name: obs.name.clone(),
                market_cap,
                industry: sectors.industry_of(&obs.code).map(str::to_string),
            })
        })
        .collect()
}

/// Reshape, join and derive the market tables.
///
/// Any failure here is fatal for the session: every market view depends on it.
pub fn load_market_data(sources: &MarketSources, options: &ReshapeOptions) -> LoadResult<MarketData> {
    let volumes = read_wide(&sources.volume, Metric::Volume, options)?;
    let prices = read_wide(&sources.price, Metric::Close, options)?;
    let sectors = SectorTable::load(&sources.sector)?;

    let trades = build_trade_table(&prices, &volumes, &sectors);
    let market_caps = match &sources.market_cap {
        Some(path) => {
            let caps = read_wide(path, Metric::MarketCap, options)?;
            build_market_cap_table(&caps, &sectors)
        }
        None => Vec::new(),
    };

    tracing::info!(
        "Prepared market data: {} trade rows, {} market-cap rows, {} price rows",
        trades.len(),
        market_caps.len(),
        prices.len()
    );

    Ok(MarketData {
        trades,
        market_caps,
        prices: prices.rows,
        has_industry: sectors.has_industry(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::read_wide_from;
    use std::path::Path;

    fn wide(csv: &str, metric: Metric) -> ObservationTable {
        read_wide_from(csv.as_bytes(), Path::new("mem.csv"), metric, &ReshapeOptions::default()).unwrap()
    }

    fn sectors() -> SectorTable {
        SectorTable::from_pairs([("VIC", Some("Bất động sản")), ("FPT", None::<&str>)])
    }

    #[test]
    fn test_end_to_end_trade_value() {
        let volume = wide("Name,Code,01-01-2024,02-01-2024\nVingroup,VIC,100,200\n", Metric::Volume);
        let price = wide("Name,Code,01-01-2024,02-01-2024\nVingroup,VIC,10,20\n", Metric::Close);

        let trades = build_trade_table(&price, &volume, &sectors());
        assert_eq!(trades.len(), 2);
        assert!((trades[0].trade_value - 1e-6).abs() < 1e-15);
        assert!((trades[1].trade_value - 4e-6).abs() < 1e-15);
        assert_eq!(trades[0].industry.as_deref(), Some("Bất động sản"));
    }

    #[test]
    fn test_trade_value_invariant_and_null_rows_dropped() {
        let volume = wide(
            "Name,Code,01-01-2024,02-01-2024,03-01-2024\nVingroup,VIC,100,,300\nFPT,FPT,7,8,9\n",
            Metric::Volume,
        );
        let price = wide(
            "Name,Code,01-01-2024,02-01-2024,03-01-2024\nVingroup,VIC,10,20,\nFPT,FPT,1.5,2.5,3.5\n",
            Metric::Close,
        );

        let trades = build_trade_table(&price, &volume, &sectors());
        assert_eq!(trades.len(), 4);
        for t in &trades {
            assert!((t.trade_value - t.close * t.volume / 1e9).abs() < 1e-12);
        }
        assert!(trades.iter().all(|t| !(t.code == "VIC" && t.date != NaiveDate::from_ymd_opt(2024, 1, 1))));
        assert!(trades.iter().filter(|t| t.code == "FPT").all(|t| t.industry.is_none()));
    }

    #[test]
    fn test_inner_join_skips_unmatched_codes() {
        let volume = wide("Name,Code,01-01-2024\nVingroup,VIC,100\n", Metric::Volume);
        let price = wide("Name,Code,01-01-2024\nHoa Phat,HPG,10\n", Metric::Close);
        assert!(build_trade_table(&price, &volume, &sectors()).is_empty());
    }

    #[test]
    fn test_market_cap_drops_null_values() {
        let caps = wide("Name,Code,01-01-2024,02-01-2024\nVingroup,VIC,5000,\n", Metric::MarketCap);
        let rows = build_market_cap_table(&caps, &sectors());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].market_cap, 5000.0);
        assert_eq!(rows[0].industry.as_deref(), Some("Bất động sản"));
    }
}
