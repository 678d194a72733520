// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (span + 1)
//   EMA_t      = value_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The recurrence is seeded with the first defined input value and an output
// is only reported once `span` inputs have been observed. Leading undefined
// inputs (e.g. the warm-up of a MACD line) are skipped, so the EMA of a
// partially defined series starts where its input starts.
// =============================================================================

/// Compute an EMA aligned 1:1 with `values`.
///
/// The output has the same length as the input. Entries before the `span`-th
/// defined input are `None`.
///
/// # Edge cases
/// - `span == 0` => every entry `None`
/// - An undefined input after the series has started carries the previous
///   EMA forward without counting as an observation.
/// - Non-finite intermediate values stop the series; later entries are `None`.
pub fn calculate_ema(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if span == 0 {
        return result;
    }

    let multiplier = 2.0 / (span + 1) as f64;
    let mut prev: Option<f64> = None;
    let mut observed = 0usize;

    for (i, value) in values.iter().enumerate() {
        let ema = match (prev, value) {
            (None, None) => continue,
            (None, Some(v)) => *v,
            (Some(p), None) => p,
            (Some(p), Some(v)) => v * multiplier + p * (1.0 - multiplier),
        };
        if !ema.is_finite() {
            // Downstream consumers should not trust a broken series.
            break;
        }
        if value.is_some() {
            observed += 1;
        }
        prev = Some(ema);
        if observed >= span {
            result[i] = Some(ema);
        }
    }

    result
}

/// EMA of a fully defined series such as closing prices.
pub fn ema_of_closes(closes: &[f64], span: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    calculate_ema(&values, span)
}
