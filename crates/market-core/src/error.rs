use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown investor class: {0}")]
    UnknownInvestorClass(String),

    #[error("Unknown execution type: {0}")]
    UnknownExecutionType(String),
}
