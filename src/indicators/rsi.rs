// =============================================================================
// Relative Strength Index (RSI): Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1: Compute price changes (deltas) from consecutive closes. The first
//          close has no predecessor; its delta counts as zero.
// Step 2: Split each delta into a gain and a loss (both non-negative).
// Step 3: Apply Wilder's exponential smoothing, seeded with the first
//          (zero) delta:
//            avg_gain = avg_gain + (gain - avg_gain) / period
//            avg_loss = avg_loss + (loss - avg_loss) / period
// Step 4: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS), and 100 when avg_loss is zero.
//
// A value is reported from the `period`-th close onwards (index period - 1).
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

/// Compute the RSI series for `closes`, aligned 1:1 with the input.
///
/// # Edge cases
/// - `period == 0` => every entry `None`
/// - `closes.len() < period` => every entry `None`
/// - If average loss is zero (no down moves), RSI is 100.0.
/// - Non-finite results stop the series; later entries are `None`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return result;
    }

    let period_f = period as f64;
    let mut avg_gain = 0.0_f64;
    let mut avg_loss = 0.0_f64;

    for i in 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain += (gain - avg_gain) / period_f;
        avg_loss += (loss - avg_loss) / period_f;

        if i + 1 < period {
            continue;
        }

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result[i] = Some(rsi),
            None => break,
        }
    }

    // Index 0 only becomes defined for a one-period window.
    if period == 1 {
        result[0] = rsi_from_averages(0.0, 0.0);
    }

    result
}

/// Human-readable zone for an RSI reading.
pub fn rsi_zone(value: f64) -> &'static str {
    if value >= 70.0 {
        "OVERBOUGHT"
    } else if value <= 30.0 {
        "OVERSOLD"
    } else {
        "NEUTRAL"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If average loss is zero, RSI is 100.0 (this includes a flat market).
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi.clamp(0.0, 100.0))
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert_eq!(calculate_rsi(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn rsi_insufficient_data() {
        let closes: Vec<f64> = (1..=13).map(|x| x as f64).collect();
        assert!(calculate_rsi(&closes, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_ascending_thirty_points() {
        // Strictly ascending prices => undefined for 0..=12, 100 from 13.
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 30);
        for v in &series[..13] {
            assert!(v.is_none());
        }
        for v in &series[13..] {
            assert_relative_eq!(v.unwrap(), 100.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        for v in series.iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
        assert!(series[13].is_some());
    }

    #[test]
    fn rsi_flat_market_has_no_losses() {
        let series = calculate_rsi(&[100.0; 30], 14);
        for v in series.iter().flatten() {
            assert_relative_eq!(*v, 100.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn rsi_matches_wilder_recurrence_by_hand() {
        // period 2: deltas [0, +2, -1]
        // avg_gain: 0 -> 1 -> 0.5, avg_loss: 0 -> 0 -> 0.5
        let series = calculate_rsi(&[10.0, 12.0, 11.0], 2);
        assert_eq!(series[0], None);
        assert_relative_eq!(series[1].unwrap(), 100.0, epsilon = 1e-12);
        assert_relative_eq!(series[2].unwrap(), 50.0, epsilon = 1e-12);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series = calculate_rsi(&closes, 14);
        assert!(series.iter().flatten().count() > 0);
        for &v in series.iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_zone_labels() {
        assert_eq!(rsi_zone(100.0), "OVERBOUGHT");
        assert_eq!(rsi_zone(0.0), "OVERSOLD");
        assert_eq!(rsi_zone(50.0), "NEUTRAL");
    }
}
