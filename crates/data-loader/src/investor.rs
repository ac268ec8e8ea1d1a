//! Pre-aggregated investor net-flow table.
//!
//! One row per (Date, Industry) with eight signed net-value columns named
//! `"<class> <execution> Ròng"`. The industry header may be `Industry` or the
//! localized `Ngành`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use market_core::{FlowColumn, InvestorFlowRecord};
use std::io::Read;
use std::path::Path;

use crate::error::{column_index, open_csv, LoadError, LoadResult};

const DATE_COLUMN: &str = "Date";
const INDUSTRY_COLUMNS: [&str; 2] = ["Industry", "Ngành"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parse an investor-flow date; unparseable values become `None`
pub fn parse_flow_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

pub fn load_investor_flows(path: &Path) -> LoadResult<Vec<InvestorFlowRecord>> {
    let reader = open_csv(path)?;
    let records = parse_records(reader, path)?;
    tracing::info!("Loaded {} investor-flow rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn investor_flows_from_reader<R: Read>(source: R, origin: &Path) -> LoadResult<Vec<InvestorFlowRecord>> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    parse_records(reader, origin)
}

fn parse_records<R: Read>(mut reader: csv::Reader<R>, origin: &Path) -> LoadResult<Vec<InvestorFlowRecord>> {
    let headers = reader
        .headers()
        .map_err(|e| LoadError::csv(origin, e))?
        .clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let date = column_index(&headers, DATE_COLUMN)
        .ok_or_else(|| LoadError::missing_column(origin, DATE_COLUMN))?;
    let industry = INDUSTRY_COLUMNS
        .iter()
        .find_map(|name| column_index(&headers, name));
    if industry.is_none() {
        tracing::warn!("{}: no industry column, per-industry views will be skipped", origin.display());
    }

    let mut value_columns = [0usize; FlowColumn::COUNT];
    for column in FlowColumn::all() {
        let header = column.header();
        value_columns[column.index()] = column_index(&headers, &header)
            .ok_or_else(|| LoadError::missing_column(origin, &header))?;
    }

    let mut records = Vec::new();
    let mut invalid_dates = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::csv(origin, e))?;

        let parsed_date = record.get(date).and_then(parse_flow_date);
        if parsed_date.is_none() {
            invalid_dates += 1;
        }

        let mut net = [0.0; FlowColumn::COUNT];
        for (slot, &col) in net.iter_mut().zip(value_columns.iter()) {
            *slot = record
                .get(col)
                .map(str::trim)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| !v.is_nan())
                .unwrap_or(0.0);
        }

        records.push(InvestorFlowRecord {
            date: parsed_date,
            industry: industry
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            net,
        });
    }

    if invalid_dates > 0 {
        tracing::warn!("{}: {} row(s) with unparseable dates", origin.display(), invalid_dates);
    }
    Ok(records)
}
