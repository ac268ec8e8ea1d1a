/// Simple Moving Average, one value per full window
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    let mut sum: f64 = data[..period].iter().sum();
    result.push(sum / period as f64);
    for i in period..data.len() {
        sum += data[i] - data[i - period];
        result.push(sum / period as f64);
    }
    result
}

/// Trailing moving average aligned with `data`; `None` until the first full window
pub fn rolling_mean(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let means = sma(data, period);
    let warmup = data.len() - means.len();
    std::iter::repeat(None)
        .take(warmup)
        .chain(means.into_iter().map(Some))
        .collect()
}

/// Exponential Moving Average with smoothing factor 2 / (span + 1).
///
/// Seeded by the first value and applied recursively with no bias
/// adjustment, so the output has the same length as the input.
pub fn ema(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || data.is_empty() {
        return vec![];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let prev = result[i - 1];
        result.push(prev + alpha * (data[i] - prev));
    }

    result
}

/// MACD (Moving Average Convergence Divergence), all lines aligned with the input
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
}

pub fn macd(data: &[f64], fast_span: usize, slow_span: usize, signal_span: usize) -> MacdResult {
    if fast_span == 0 || slow_span == 0 || signal_span == 0 || slow_span < fast_span {
        return MacdResult { macd_line: vec![], signal_line: vec![] };
    }

    let ema_fast = ema(data, fast_span);
    let ema_slow = ema(data, slow_span);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = ema(&macd_line, signal_span);

    MacdResult {
        macd_line,
        signal_line,
    }
}

/// Single-step upward crossovers of `fast` over `slow`.
///
/// Index `i` is true iff `fast[i] > slow[i]` and `fast[i-1] <= slow[i-1]`.
/// Index 0, and any step where a value is undefined, is false.
pub fn crossed_above(fast: &[Option<f64>], slow: &[Option<f64>]) -> Vec<bool> {
    let n = fast.len().min(slow.len());
    (0..n)
        .map(|i| {
            if i == 0 {
                return false;
            }
            match (fast[i], slow[i], fast[i - 1], slow[i - 1]) {
                (Some(f), Some(s), Some(pf), Some(ps)) => f > s && pf <= ps,
                _ => false,
            }
        })
        .collect()
}

/// Days on which MACD crossed above its signal line
pub fn macd_crossovers(closes: &[f64], fast_span: usize, slow_span: usize, signal_span: usize) -> Vec<bool> {
    let result = macd(closes, fast_span, slow_span, signal_span);
    let line: Vec<Option<f64>> = result.macd_line.into_iter().map(Some).collect();
    let signal: Vec<Option<f64>> = result.signal_line.into_iter().map(Some).collect();
    crossed_above(&line, &signal)
}

/// Days on which the close crossed above its trailing `period` average
pub fn moving_average_crossovers(closes: &[f64], period: usize) -> Vec<bool> {
    let price: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    crossed_above(&price, &rolling_mean(closes, period))
}
