//! data-loader: flat-file ingestion for the market dashboards.
//!
//! Reads wide per-date CSVs (volume, close, market cap) into long observation
//! tables, attaches sector classifications, loads the pre-aggregated
//! investor-flow table, and memoizes prepared tables per load key.

pub mod cache;
pub mod error;
pub mod investor;
pub mod prepare;
pub mod reshape;
pub mod sector;

pub use cache::{DataCache, LoadKey};
pub use error::{LoadError, LoadResult};
pub use investor::load_investor_flows;
pub use prepare::{build_market_cap_table, build_trade_table, load_market_data, MarketData, MarketSources};
pub use reshape::{pivot_wide, read_wide, ReshapeOptions, WideRow, WideTable, DEFAULT_CHUNK_SIZE};
pub use sector::SectorTable;
