//! Memoized loads.
//!
//! Source files are treated as immutable for the life of a `DataCache`: a
//! second request with the same key returns the table built the first time,
//! even if the file has since changed or disappeared. Entries are never
//! evicted; drop the cache to reload.

use dashmap::DashMap;
use market_core::{DateRange, InvestorFlowRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LoadResult;
use crate::investor::load_investor_flows;
use crate::prepare::{load_market_data, MarketData, MarketSources};
use crate::reshape::{ReshapeOptions, DEFAULT_CHUNK_SIZE};

/// Identifies one prepared market load
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub sources: MarketSources,
    /// `Some` for loads that pre-filter chunks during ingestion
    pub range: Option<DateRange>,
}

pub struct DataCache {
    chunk_size: usize,
    market: DashMap<LoadKey, Arc<MarketData>>,
    investor: DashMap<PathBuf, Arc<Vec<InvestorFlowRecord>>>,
}

impl DataCache {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            market: DashMap::new(),
            investor: DashMap::new(),
        }
    }

    /// Prepared market tables for `sources`, optionally bounded to `range` at load time
    pub fn market(&self, sources: &MarketSources, range: Option<DateRange>) -> LoadResult<Arc<MarketData>> {
        let key = LoadKey {
            sources: sources.clone(),
            range,
        };
        if let Some(entry) = self.market.get(&key) {
            tracing::debug!("Market cache hit for {}", sources.price.display());
            return Ok(Arc::clone(entry.value()));
        }

        tracing::debug!("Market cache miss for {}", sources.price.display());
        let options = ReshapeOptions {
            chunk_size: self.chunk_size,
            range,
        };
        let data = Arc::new(load_market_data(sources, &options)?);
        Ok(Arc::clone(self.market.entry(key).or_insert(data).value()))
    }

    pub fn investor_flows(&self, path: &Path) -> LoadResult<Arc<Vec<InvestorFlowRecord>>> {
        if let Some(entry) = self.investor.get(path) {
            tracing::debug!("Investor-flow cache hit for {}", path.display());
            return Ok(Arc::clone(entry.value()));
        }

        let rows = Arc::new(load_investor_flows(path)?);
        Ok(Arc::clone(
            self.investor
                .entry(path.to_path_buf())
                .or_insert(rows)
                .value(),
        ))
    }

    /// Number of memoized loads
    pub fn len(&self) -> usize {
        self.market.len() + self.investor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn write_sources(dir: &Path) -> MarketSources {
        fs::write(
            dir.join("volume.csv"),
            "Name,Code,01-01-2024,02-01-2024\nVingroup,VIC,100,200\n",
        )
        .unwrap();
        fs::write(
            dir.join("price.csv"),
            "Name,Code,01-01-2024,02-01-2024\nVingroup,VIC,10,20\n",
        )
        .unwrap();
        fs::write(dir.join("sector.csv"), "Mã,Ngành ICB - cấp 1\nVIC,Bất động sản\n").unwrap();

        MarketSources {
            volume: dir.join("volume.csv"),
            price: dir.join("price.csv"),
            market_cap: None,
            sector: dir.join("sector.csv"),
        }
    }

    #[test]
    fn test_repeated_load_returns_memoized_table() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let cache = DataCache::default();

        let first = cache.market(&sources, None).unwrap();
        fs::remove_file(&sources.price).unwrap();
        let second = cache.market(&sources, None).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.trades.len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_range_is_part_of_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let cache = DataCache::new(1);
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let range = DateRange::new(day(2), day(2)).unwrap();

        let full = cache.market(&sources, None).unwrap();
        let bounded = cache.market(&sources, Some(range)).unwrap();

        assert_eq!(full.trades.len(), 2);
        assert_eq!(bounded.trades.len(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_missing_file_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::default();

        assert!(cache.investor_flows(&dir.path().join("flows.csv")).is_err());
        assert!(cache.is_empty());
    }
}
