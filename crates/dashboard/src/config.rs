use data_loader::{MarketSources, DEFAULT_CHUNK_SIZE};
use std::path::PathBuf;

/// Where the dashboard reads its flat files from
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub volume_path: PathBuf,
    pub price_path: PathBuf,
    /// `None` disables the market-cap views
    pub market_cap_path: Option<PathBuf>,
    pub sector_path: PathBuf,
    pub investor_path: PathBuf,
    pub chunk_size: usize,
    /// Pre-filter wide files by the requested range while reading them
    pub bounded_loads: bool,
}

impl Default for DashboardConfig {
    /// Read from the process environment; `main` loads `.env` first
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl DashboardConfig {
    /// Build from `DASHBOARD_*` variables resolved by `lookup`, with defaults for unset keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str, default: &str| PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()));

        let market_cap_path = match lookup("DASHBOARD_MARKETCAP_PATH") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(PathBuf::from(value)),
            None => Some(PathBuf::from("data/Vietnam_Marketcap_cleaned.csv")),
        };

        Self {
            volume_path: path("DASHBOARD_VOLUME_PATH", "data/Vietnam_volume_cleaned.csv"),
            price_path: path("DASHBOARD_PRICE_PATH", "data/Vietnam_Price_cleaned.csv"),
            market_cap_path,
            sector_path: path("DASHBOARD_SECTOR_PATH", "data/Phan_loai_nganh.csv"),
            investor_path: path("DASHBOARD_INVESTOR_PATH", "data/combined_data.csv"),
            chunk_size: lookup("DASHBOARD_CHUNK_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            bounded_loads: lookup("DASHBOARD_BOUNDED_LOADS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn market_sources(&self) -> MarketSources {
        MarketSources {
            volume: self.volume_path.clone(),
            price: self.price_path.clone(),
            market_cap: self.market_cap_path.clone(),
            sector: self.sector_path.clone(),
        }
    }
}
