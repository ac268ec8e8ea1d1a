//! Ticker to industry classification.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{column_index, open_csv, LoadError, LoadResult};

pub const CODE_COLUMN: &str = "Code";
pub const LOCALIZED_CODE_COLUMN: &str = "Mã";
pub const INDUSTRY_COLUMN: &str = "Industry";
pub const LOCALIZED_INDUSTRY_COLUMN: &str = "Ngành ICB - cấp 1";

/// Lookup table keyed by ticker code.
///
/// `has_industry` is false when the source carries no industry column at all;
/// views that group by industry must then be skipped rather than rendered empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorTable {
    industries: HashMap<String, Option<String>>,
    has_industry: bool,
}

impl SectorTable {
    pub fn load(path: &Path) -> LoadResult<Self> {
        let reader = open_csv(path)?;
        let table = Self::from_csv(reader, path)?;
        tracing::info!(
            "Loaded sector classification for {} tickers from {} (industry column: {})",
            table.len(),
            path.display(),
            table.has_industry
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(source: R, origin: &Path) -> LoadResult<Self> {
        let reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
        Self::from_csv(reader, origin)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, origin: &Path) -> LoadResult<Self> {
        let headers = reader
            .headers()
            .map_err(|e| LoadError::csv(origin, e))?
            .clone();

        let code = column_index(&headers, CODE_COLUMN)
            .or_else(|| column_index(&headers, LOCALIZED_CODE_COLUMN))
            .ok_or_else(|| LoadError::missing_column(origin, CODE_COLUMN))?;
        let industry = column_index(&headers, INDUSTRY_COLUMN)
            .or_else(|| column_index(&headers, LOCALIZED_INDUSTRY_COLUMN));

        let mut industries = HashMap::new();
        let mut duplicates = 0usize;
        for record in reader.records() {
            let record = record.map_err(|e| LoadError::csv(origin, e))?;
            let ticker = record.get(code).unwrap_or_default().trim();
            if ticker.is_empty() {
                continue;
            }
            let sector = industry
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            if industries.contains_key(ticker) {
                duplicates += 1;
                continue;
            }
            industries.insert(ticker.to_string(), sector);
        }

        if duplicates > 0 {
            tracing::warn!(
                "{}: {} duplicate ticker row(s) ignored, first classification kept",
                origin.display(),
                duplicates
            );
        }

        Ok(Self {
            industries,
            has_industry: industry.is_some(),
        })
    }

    /// Build directly from (code, industry) pairs
    pub fn from_pairs<I, C, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, Option<S>)>,
        C: Into<String>,
        S: Into<String>,
    {
        let mut industries = HashMap::new();
        for (code, industry) in pairs {
            industries
                .entry(code.into())
                .or_insert_with(|| industry.map(Into::into));
        }
        Self {
            industries,
            has_industry: true,
        }
    }

    /// Left-join lookup: `None` for unclassified or unknown tickers
    pub fn industry_of(&self, code: &str) -> Option<&str> {
        self.industries.get(code).and_then(|s| s.as_deref())
    }

    pub fn has_industry(&self) -> bool {
        self.has_industry
    }

    pub fn len(&self) -> usize {
        self.industries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.industries.is_empty()
    }
}
