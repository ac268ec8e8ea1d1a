use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::MarketError;

/// Value semantics of a wide per-date table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Volume,
    Close,
    MarketCap,
}

impl Metric {
    /// Column name of the value after reshaping
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Volume => "Volume",
            Metric::Close => "Close",
            Metric::MarketCap => "MarketCap",
        }
    }
}

/// One (entity, date) observation in long format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub name: String,
    pub code: String,
    /// `None` when the source column header was not a valid DD-MM-YYYY date
    pub date: Option<NaiveDate>,
    /// `None` when the cell was empty or not numeric
    pub value: Option<f64>,
}

/// A reshaped value stream: chunks in input order, and within a chunk every
/// source row for one date column before the next column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    pub metric: Metric,
    pub rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(metric: Metric) -> Self {
        Self { metric, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest valid dates in the table
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_bounds(self.rows.iter().filter_map(|r| r.date))
    }
}

/// Close x Volume joined on (date, code), with the entity's industry attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: Option<NaiveDate>,
    pub code: String,
    pub name: String,
    pub close: f64,
    pub volume: f64,
    /// Close * Volume / 1e9, in billions of VND
    pub trade_value: f64,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCapRecord {
    pub date: Option<NaiveDate>,
    pub code: String,
    pub name: String,
    pub market_cap: f64,
    pub industry: Option<String>,
}

/// Investor class reported in the net-flow table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvestorClass {
    Individual,
    Foreign,
    DomesticInstitution,
    Proprietary,
}

impl InvestorClass {
    pub const ALL: [InvestorClass; 4] = [
        InvestorClass::Individual,
        InvestorClass::Foreign,
        InvestorClass::DomesticInstitution,
        InvestorClass::Proprietary,
    ];

    /// Header label used in the source CSV
    pub fn header_label(&self) -> &'static str {
        match self {
            InvestorClass::Individual => "Cá nhân",
            InvestorClass::Foreign => "Nước ngoài",
            InvestorClass::DomesticInstitution => "Tổ chức trong nước",
            InvestorClass::Proprietary => "Tự doanh",
        }
    }

    /// Short label used on flow-total charts
    pub fn short_label(&self) -> &'static str {
        match self {
            InvestorClass::DomesticInstitution => "Tổ chức",
            other => other.header_label(),
        }
    }

    fn index(&self) -> usize {
        match self {
            InvestorClass::Individual => 0,
            InvestorClass::Foreign => 1,
            InvestorClass::DomesticInstitution => 2,
            InvestorClass::Proprietary => 3,
        }
    }
}

impl FromStr for InvestorClass {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" | "cá nhân" => Ok(InvestorClass::Individual),
            "foreign" | "nước ngoài" => Ok(InvestorClass::Foreign),
            "institution" | "domestic-institution" | "tổ chức" | "tổ chức trong nước" => {
                Ok(InvestorClass::DomesticInstitution)
            }
            "proprietary" | "tự doanh" => Ok(InvestorClass::Proprietary),
            _ => Err(MarketError::UnknownInvestorClass(s.to_string())),
        }
    }
}

/// How the trades were executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExecutionType {
    /// Order-matched ("Khớp")
    Matched,
    /// Negotiated / put-through ("Thỏa thuận")
    Negotiated,
}

impl ExecutionType {
    pub const ALL: [ExecutionType; 2] = [ExecutionType::Matched, ExecutionType::Negotiated];

    pub fn header_label(&self) -> &'static str {
        match self {
            ExecutionType::Matched => "Khớp",
            ExecutionType::Negotiated => "Thỏa thuận",
        }
    }

    fn index(&self) -> usize {
        match self {
            ExecutionType::Matched => 0,
            ExecutionType::Negotiated => 1,
        }
    }
}

impl FromStr for ExecutionType {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "matched" | "khớp" => Ok(ExecutionType::Matched),
            "negotiated" | "thỏa thuận" => Ok(ExecutionType::Negotiated),
            _ => Err(MarketError::UnknownExecutionType(s.to_string())),
        }
    }
}

/// One of the eight net-value columns of the investor-flow table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowColumn {
    pub class: InvestorClass,
    pub execution: ExecutionType,
}

impl FlowColumn {
    pub const COUNT: usize = 8;

    pub fn new(class: InvestorClass, execution: ExecutionType) -> Self {
        Self { class, execution }
    }

    /// All columns in source order: matched classes first, then negotiated
    pub fn all() -> impl Iterator<Item = FlowColumn> {
        ExecutionType::ALL.into_iter().flat_map(|execution| {
            InvestorClass::ALL
                .into_iter()
                .map(move |class| FlowColumn::new(class, execution))
        })
    }

    /// e.g. "Nước ngoài Khớp Ròng"
    pub fn header(&self) -> String {
        format!(
            "{} {} Ròng",
            self.class.header_label(),
            self.execution.header_label()
        )
    }

    pub fn index(&self) -> usize {
        self.execution.index() * InvestorClass::ALL.len() + self.class.index()
    }
}

/// Pre-aggregated net flows for one (date, industry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorFlowRecord {
    pub date: Option<NaiveDateTime>,
    pub industry: Option<String>,
    /// Indexed by `FlowColumn::index`; missing cells are stored as 0.0
    pub net: [f64; FlowColumn::COUNT],
}

impl InvestorFlowRecord {
    pub fn net(&self, column: FlowColumn) -> f64 {
        self.net[column.index()]
    }

    /// Matched plus negotiated net value for one class
    pub fn class_total(&self, class: InvestorClass) -> f64 {
        ExecutionType::ALL
            .iter()
            .map(|&execution| self.net(FlowColumn::new(class, execution)))
            .sum()
    }
}

/// Crossover flags for one ticker on its last observed day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalFlag {
    pub code: String,
    pub as_of: NaiveDate,
    pub macd_increasing: bool,
    pub ma200_increasing: bool,
}

/// Why a dependent view was not produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The filter window contains no rows
    NoData,
    /// The sector join did not yield an Industry column
    MissingIndustry,
}

impl SkipReason {
    pub fn notice(&self) -> &'static str {
        match self {
            SkipReason::NoData => "No data in the selected date range",
            SkipReason::MissingIndustry => "Industry classification is not available",
        }
    }
}

/// Outcome of one optional view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    Skipped(SkipReason),
}

impl<T> Section<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Skipped(_) => None,
        }
    }
}

pub(crate) fn date_bounds(dates: impl Iterator<Item = NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    dates.fold(None, |acc, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })
}
