//! Wide-to-long reshaping.
//!
//! A wide table has two identifier columns (`Name`, `Code`) and one column per
//! calendar date labelled `DD-MM-YYYY`. Each chunk of rows is melted into
//! (Name, Code, Date, Value) observations: date columns outermost, source rows
//! innermost. Chunks are appended in input order.

use chrono::NaiveDate;
use market_core::{DateRange, Metric, Observation, ObservationTable};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{column_index, open_csv, LoadError, LoadResult};

/// Rows per reshape chunk, bounding the peak size of the raw record buffer
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

const NAME_COLUMN: &str = "Name";
const CODE_COLUMN: &str = "Code";
const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReshapeOptions {
    pub chunk_size: usize,
    /// When set, observations outside the range (or with invalid dates) are
    /// dropped chunk by chunk during ingestion
    pub range: Option<DateRange>,
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            range: None,
        }
    }
}

/// Column positions resolved from the header row
struct WideLayout {
    name: usize,
    code: usize,
    dates: Vec<(usize, Option<NaiveDate>)>,
}

impl WideLayout {
    fn from_headers(headers: &csv::StringRecord, origin: &Path) -> LoadResult<Self> {
        let name = column_index(headers, NAME_COLUMN)
            .ok_or_else(|| LoadError::missing_column(origin, NAME_COLUMN))?;
        let code = column_index(headers, CODE_COLUMN)
            .ok_or_else(|| LoadError::missing_column(origin, CODE_COLUMN))?;

        let dates = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != name && *i != code)
            .map(|(i, label)| (i, parse_date_label(label)))
            .collect();

        Ok(Self { name, code, dates })
    }
}

/// `DD-MM-YYYY`, or `None` for anything else
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label.trim(), DATE_FORMAT).ok()
}

fn parse_value(cell: Option<&str>) -> Option<f64> {
    let cell = cell?.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Read a wide CSV file into a long observation table
pub fn read_wide(path: &Path, metric: Metric, options: &ReshapeOptions) -> LoadResult<ObservationTable> {
    let reader = open_csv(path)?;
    let table = melt_records(reader, path, metric, options)?;
    tracing::info!(
        "Reshaped {} ({}): {} observations",
        path.display(),
        metric.column_name(),
        table.len()
    );
    Ok(table)
}

/// Same as [`read_wide`] for an in-memory byte stream; `origin` labels errors
pub fn read_wide_from<R: Read>(
    source: R,
    origin: &Path,
    metric: Metric,
    options: &ReshapeOptions,
) -> LoadResult<ObservationTable> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    melt_records(reader, origin, metric, options)
}

fn melt_records<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &Path,
    metric: Metric,
    options: &ReshapeOptions,
) -> LoadResult<ObservationTable> {
    let mut table = ObservationTable::new(metric);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::csv(origin, e))?
        .clone();
    if headers.is_empty() {
        return Ok(table);
    }
    let layout = WideLayout::from_headers(&headers, origin)?;

    let chunk_size = options.chunk_size.max(1);
    let mut chunk: Vec<csv::StringRecord> = Vec::with_capacity(chunk_size.min(4096));
    let mut chunks = 0usize;

    for record in reader.records() {
        chunk.push(record.map_err(|e| LoadError::csv(origin, e))?);
        if chunk.len() == chunk_size {
            melt_chunk(&layout, &chunk, options.range, &mut table.rows);
            chunk.clear();
            chunks += 1;
        }
    }
    if !chunk.is_empty() {
        melt_chunk(&layout, &chunk, options.range, &mut table.rows);
        chunks += 1;
    }

    tracing::debug!(
        "{}: {} chunk(s) of up to {} rows",
        origin.display(),
        chunks,
        chunk_size
    );
    Ok(table)
}

fn melt_chunk(
    layout: &WideLayout,
    chunk: &[csv::StringRecord],
    range: Option<DateRange>,
    out: &mut Vec<Observation>,
) {
    for &(column, date) in &layout.dates {
        if let Some(range) = range {
            match date {
                Some(d) if range.contains_date(d) => {}
                _ => continue,
            }
        }

        for record in chunk {
            out.push(Observation {
                name: record.get(layout.name).unwrap_or_default().trim().to_string(),
                code: record.get(layout.code).unwrap_or_default().trim().to_string(),
                date,
                value: parse_value(record.get(column)),
            });
        }
    }
}

/// One entity row of a re-pivoted table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideRow {
    pub name: String,
    pub code: String,
    /// Aligned with `WideTable::dates`
    pub values: Vec<Option<f64>>,
}

/// A long table pivoted back to one row per entity and one column per date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideTable {
    pub dates: Vec<Option<NaiveDate>>,
    pub rows: Vec<WideRow>,
}

/// Inverse of the melt: dates and entities keep their first-seen order.
///
/// An entity's n-th observation for a date lands in the n-th column carrying
/// that date, so repeated headers (invalid dates included) stay apart.
pub fn pivot_wide(table: &ObservationTable) -> WideTable {
    let mut dates: Vec<Option<NaiveDate>> = Vec::new();
    let mut date_pos: HashMap<(Option<NaiveDate>, usize), usize> = HashMap::new();
    let mut entity_pos: HashMap<(&str, &str), usize> = HashMap::new();
    let mut occurrences: HashMap<(usize, Option<NaiveDate>), usize> = HashMap::new();
    let mut rows: Vec<WideRow> = Vec::new();
    let mut cells = Vec::with_capacity(table.rows.len());

    for obs in &table.rows {
        let r = *entity_pos
            .entry((obs.name.as_str(), obs.code.as_str()))
            .or_insert_with(|| {
                rows.push(WideRow {
                    name: obs.name.clone(),
                    code: obs.code.clone(),
                    values: Vec::new(),
                });
                rows.len() - 1
            });
        let seen = occurrences.entry((r, obs.date)).or_insert(0);
        let nth = *seen;
        *seen += 1;
        let c = *date_pos.entry((obs.date, nth)).or_insert_with(|| {
            dates.push(obs.date);
            dates.len() - 1
        });
        cells.push((r, c, obs.value));
    }

    for row in &mut rows {
        row.values = vec![None; dates.len()];
    }
    for (r, c, value) in cells {
        rows[r].values[c] = value;
    }

    WideTable { dates, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VOLUME_CSV: &str = "\
Name,Code,01-01-2024,02-01-2024,03-01-2024
Vingroup,VIC,100,200,
Vinamilk,VNM,50,60,70
FPT Corp,FPT,1,2,3
";

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn melt(csv: &str, options: &ReshapeOptions) -> ObservationTable {
        read_wide_from(csv.as_bytes(), Path::new("volume.csv"), Metric::Volume, options).unwrap()
    }

    #[test]
    fn test_melt_produces_k_times_m_rows() {
        let table = melt(VOLUME_CSV, &ReshapeOptions::default());
        assert_eq!(table.len(), 3 * 3);
        assert_eq!(table.metric, Metric::Volume);
    }

    #[test]
    fn test_melt_order_is_date_major_within_chunk() {
        let table = melt(VOLUME_CSV, &ReshapeOptions::default());
        let order: Vec<(&str, Option<NaiveDate>)> = table
            .rows
            .iter()
            .map(|o| (o.code.as_str(), o.date))
            .collect();

        assert_eq!(order[0], ("VIC", Some(day(2024, 1, 1))));
        assert_eq!(order[1], ("VNM", Some(day(2024, 1, 1))));
        assert_eq!(order[2], ("FPT", Some(day(2024, 1, 1))));
        assert_eq!(order[3], ("VIC", Some(day(2024, 1, 2))));
    }

    #[test]
    fn test_chunks_are_concatenated_in_input_order() {
        let chunked = melt(VOLUME_CSV, &ReshapeOptions { chunk_size: 2, range: None });
        assert_eq!(chunked.len(), 9);

        // first chunk (VIC, VNM) across all dates, then FPT across all dates
        let codes: Vec<&str> = chunked.rows.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["VIC", "VNM", "VIC", "VNM", "VIC", "VNM", "FPT", "FPT", "FPT"]
        );
    }

    #[test]
    fn test_empty_cells_become_null_values() {
        let table = melt(VOLUME_CSV, &ReshapeOptions::default());
        let vic_last = table
            .rows
            .iter()
            .find(|o| o.code == "VIC" && o.date == Some(day(2024, 1, 3)))
            .unwrap();
        assert_eq!(vic_last.value, None);
    }

    #[test]
    fn test_invalid_date_headers_are_kept_as_null_dates() {
        let csv = "Name,Code,01-01-2024,2024/01/02\nVingroup,VIC,1,2\n";
        let table = melt(csv, &ReshapeOptions::default());

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].date, None);
        assert_eq!(table.rows[1].value, Some(2.0));
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        assert!(melt("", &ReshapeOptions::default()).is_empty());
        assert!(melt("Name,Code,01-01-2024\n", &ReshapeOptions::default()).is_empty());
    }

    #[test]
    fn test_missing_identifier_column_is_reported() {
        let err = read_wide_from(
            "Name,01-01-2024\nVingroup,1\n".as_bytes(),
            Path::new("volume.csv"),
            Metric::Volume,
            &ReshapeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "Code"));
    }

    #[test]
    fn test_range_prefilter_drops_out_of_range_and_invalid_dates() {
        let csv = "Name,Code,31-12-2023,01-01-2024,bad,02-01-2024\nVingroup,VIC,1,2,3,4\n";
        let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 1)).unwrap();
        let table = melt(csv, &ReshapeOptions { chunk_size: 10, range: Some(range) });

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].value, Some(2.0));
    }

    #[test]
    fn test_pivot_recovers_wide_table() {
        let table = melt(VOLUME_CSV, &ReshapeOptions { chunk_size: 2, range: None });
        let wide = pivot_wide(&table);

        assert_eq!(
            wide.dates,
            vec![Some(day(2024, 1, 1)), Some(day(2024, 1, 2)), Some(day(2024, 1, 3))]
        );
        let codes: Vec<&str> = wide.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["VIC", "VNM", "FPT"]);
        assert_eq!(wide.rows[0].values, vec![Some(100.0), Some(200.0), None]);
        assert_eq!(wide.rows[1].values, vec![Some(50.0), Some(60.0), Some(70.0)]);
    }

    #[test]
    fn test_pivot_keeps_invalid_date_columns_apart() {
        let csv = "\
Name,Code,01-01-2024,bad,2024/01/03,02-01-2024
Vingroup,VIC,1,2,3,4
Vinamilk,VNM,5,,7,8
FPT Corp,FPT,9,10,11,12
";
        let table = melt(csv, &ReshapeOptions { chunk_size: 2, range: None });
        let wide = pivot_wide(&table);

        assert_eq!(
            wide.dates,
            vec![Some(day(2024, 1, 1)), None, None, Some(day(2024, 1, 2))]
        );
        assert_eq!(wide.rows[0].values, vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(wide.rows[1].values, vec![Some(5.0), None, Some(7.0), Some(8.0)]);
        assert_eq!(wide.rows[2].values, vec![Some(9.0), Some(10.0), Some(11.0), Some(12.0)]);
    }

    #[test]
    fn test_read_wide_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("price.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"Name,Code,01-01-2024\nVingroup,VIC,10\n").unwrap();

        let table = read_wide(&path, Metric::Close, &ReshapeOptions::default()).unwrap();
        assert_eq!(table.rows[0].value, Some(10.0));

        let missing = dir.path().join("nope.csv");
        let err = read_wide(&missing, Metric::Close, &ReshapeOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
