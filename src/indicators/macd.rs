// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)
//   Signal line = EMA(signal) of the MACD line
//
// With the default 12/26/9 windows the MACD line is defined from index 25 and
// the signal line from index 33.
// =============================================================================

use super::ema::{calculate_ema, ema_of_closes};

/// MACD line and signal line, both aligned 1:1 with the closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let ema_fast = ema_of_closes(closes, fast);
    let ema_slow = ema_of_closes(closes, slow);

    let macd: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = calculate_ema(&macd, signal);

    MacdSeries { macd, signal }
}
