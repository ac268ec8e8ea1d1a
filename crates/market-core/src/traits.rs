use chrono::{NaiveDateTime, NaiveTime};

use crate::{InvestorFlowRecord, MarketCapRecord, Observation, TradeRecord};

/// Rows that can be placed on the calendar for range filtering
pub trait Dated {
    /// `None` for rows whose date could not be parsed
    fn timestamp(&self) -> Option<NaiveDateTime>;
}

impl Dated for Observation {
    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date.map(|d| d.and_time(NaiveTime::MIN))
    }
}

impl Dated for TradeRecord {
    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date.map(|d| d.and_time(NaiveTime::MIN))
    }
}

impl Dated for MarketCapRecord {
    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date.map(|d| d.and_time(NaiveTime::MIN))
    }
}

impl Dated for InvestorFlowRecord {
    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date
    }
}
