// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), evaluated over a trailing window at every
// close. σ is the population standard deviation of the window.

/// Upper, middle and lower bands aligned 1:1 with the closes.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bands of a single window.
#[derive(Debug, Clone, Copy)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bands for one trailing window of exactly `window.len()` closes.
///
/// Returns `None` for an empty window or a non-finite result.
pub fn bands_for_window(window: &[f64], num_std: f64) -> Option<BollingerResult> {
    if window.is_empty() {
        return None;
    }
    let n = window.len() as f64;
    let middle = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let upper = middle + num_std * std_dev;
    let lower = middle - num_std * std_dev;

    if upper.is_finite() && lower.is_finite() {
        Some(BollingerResult {
            upper,
            middle,
            lower,
        })
    } else {
        None
    }
}

/// Rolling Bollinger Bands. The first `period - 1` entries are `None`.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let len = closes.len();
    let mut out = BollingerSeries {
        upper: vec![None; len],
        middle: vec![None; len],
        lower: vec![None; len],
    };
    if period == 0 || len < period {
        return out;
    }

    for end in period..=len {
        if let Some(bb) = bands_for_window(&closes[end - period..end], num_std) {
            let i = end - 1;
            out.upper[i] = Some(bb.upper);
            out.middle[i] = Some(bb.middle);
            out.lower[i] = Some(bb.lower);
        }
    }

    out
}
