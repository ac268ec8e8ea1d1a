//! dashboard: the Vietnamese equity dashboards as data.
//!
//! Each page (market, investor overview, investor detail) is computed from a
//! `DashboardRequest` into a bundle of chart-ready tables, plus an export
//! manifest describing one page per ready chart.

pub mod config;
pub mod detail;
pub mod export;
pub mod market;
pub mod overview;
pub mod request;
pub mod session;

pub use config::DashboardConfig;
pub use detail::{compute_detail, DetailBundle, DetailStatistics, IndustryValue};
pub use export::{ExportLayout, ExportManifest, ExportPage, ImageSize, Orientation, PageSize, Placement};
pub use market::{
    compute_market, BubblePoint, ChangeStatus, IndustryCount, MarketBundle, RankedChange, RankedValue,
};
pub use overview::{compute_overview, OverviewBundle};
pub use request::{ChartKind, DashboardRequest, DetailRequest, Page};
pub use session::{DashboardSession, PageReport};
