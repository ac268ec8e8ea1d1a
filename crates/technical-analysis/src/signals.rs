//! Per-ticker crossover flags for the latest observed day.

use chrono::NaiveDate;
use market_core::{Observation, TechnicalFlag};
use std::collections::HashMap;

use crate::indicators::{macd_crossovers, moving_average_crossovers};

/// Tickers with fewer closes than this get no flag at all
pub const MIN_OBSERVATIONS: usize = 200;

pub const EMA_FAST_SPAN: usize = 12;
pub const EMA_SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;
pub const LONG_MA_PERIOD: usize = 200;

/// Flags for one ticker from its (date, close) series.
///
/// The series is sorted ascending by date first. Returns `None` when fewer
/// than `MIN_OBSERVATIONS` closes are available.
pub fn flag_for_series(code: &str, series: &[(NaiveDate, f64)]) -> Option<TechnicalFlag> {
    if series.len() < MIN_OBSERVATIONS {
        return None;
    }

    let mut sorted = series.to_vec();
    sorted.sort_by_key(|(date, _)| *date);
    let closes: Vec<f64> = sorted.iter().map(|(_, close)| *close).collect();
    let (as_of, _) = *sorted.last()?;

    let macd_up = macd_crossovers(&closes, EMA_FAST_SPAN, EMA_SLOW_SPAN, SIGNAL_SPAN);
    let ma_up = moving_average_crossovers(&closes, LONG_MA_PERIOD);

    Some(TechnicalFlag {
        code: code.to_string(),
        as_of,
        macd_increasing: macd_up.last().copied().unwrap_or(false),
        ma200_increasing: ma_up.last().copied().unwrap_or(false),
    })
}

/// Flags for every ticker in a close-price table.
///
/// Rows without a date or close are ignored. Output follows the order in
/// which tickers first appear; tickers under the observation minimum are
/// absent.
pub fn compute_flags(prices: &[Observation]) -> Vec<TechnicalFlag> {
    let mut order: Vec<&str> = Vec::new();
    let mut series: HashMap<&str, Vec<(NaiveDate, f64)>> = HashMap::new();

    for obs in prices {
        let (Some(date), Some(close)) = (obs.date, obs.value) else {
            continue;
        };
        let entry = series.entry(obs.code.as_str()).or_insert_with(|| {
            order.push(obs.code.as_str());
            Vec::new()
        });
        entry.push((date, close));
    }

    let flags: Vec<TechnicalFlag> = order
        .iter()
        .filter_map(|code| flag_for_series(code, &series[code]))
        .collect();

    tracing::debug!(
        "Technical flags computed for {} of {} tickers",
        flags.len(),
        order.len()
    );
    flags
}
