//! Flow Map Module
//!
//! Net money flow by investor class and execution type, rolled up per
//! industry and over time.

pub mod sector_flows;
pub mod totals;

pub use sector_flows::{industry_flows, melt_industry_flows, IndustryFlow, IndustryFlowBar};
pub use totals::{column_by_industry, column_daily_series, flow_statistics, flow_totals, ClassFlowTotal, FlowDirection, FlowStatistics};
