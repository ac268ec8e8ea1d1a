//! Analytics Module
//!
//! Rollups, rankings and day-over-day comparisons over tidy market tables.

pub mod change;
pub mod series;
pub mod views;

pub use change::{latest_changes, pct_change, LatestChange};
pub use series::{cumulative, daily_totals, latest_date, on_date, with_pct_change, DailyPoint};
pub use views::{group_sum, group_sum_columns, share_of_total, share_of_totals, top_k_per_group, top_n, ShareRow};
