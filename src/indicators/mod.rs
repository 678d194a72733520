// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shown on the
// dashboard. Every series is aligned 1:1 with the closes it was computed
// from; warm-up entries are `None`, never zero.
//
// `compute` is the single entry point used by the render pipeline. It
// validates the request up front and either returns every enabled series or
// fails as a whole.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DashboardError;
use crate::types::{EnabledIndicators, IndicatorKind, SeriesName};

// =============================================================================
// Parameters
// =============================================================================

fn default_rsi_window() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_bb_window() -> usize {
    20
}

fn default_bb_std_dev() -> f64 {
    2.0
}

/// Window lengths and multipliers for the indicator engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_bb_window")]
    pub bb_window: usize,

    /// Band distance in standard deviations. Must be >= 0.
    #[serde(default = "default_bb_std_dev")]
    pub bb_std_dev: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_window: default_rsi_window(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bb_window: default_bb_window(),
            bb_std_dev: default_bb_std_dev(),
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), DashboardError> {
        let windows = [
            ("rsi_window", self.rsi_window),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bb_window", self.bb_window),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(DashboardError::computation(format!("{name} must be positive")));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(DashboardError::computation(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !self.bb_std_dev.is_finite() || self.bb_std_dev < 0.0 {
            return Err(DashboardError::computation(format!(
                "bb_std_dev must be a non-negative number, got {}",
                self.bb_std_dev
            )));
        }
        Ok(())
    }

    /// Fewest closes `kind` needs before its first value is defined.
    pub fn min_required(&self, kind: IndicatorKind) -> usize {
        match kind {
            IndicatorKind::Rsi => self.rsi_window,
            IndicatorKind::Macd => self.macd_fast.max(self.macd_slow),
            IndicatorKind::Bollinger => self.bb_window,
        }
    }
}

// =============================================================================
// Output types
// =============================================================================

/// One named output series; `None` marks the warm-up period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub name: SeriesName,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    fn new(name: SeriesName, values: Vec<Option<f64>>) -> Self {
        Self { name, values }
    }

    /// Index of the first defined value, if any.
    #[cfg(test)]
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }

    /// Most recent defined value.
    pub fn latest(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

/// Every series produced by one `compute` call, keyed by name.
///
/// Only enabled indicators are present. The set is never modified after
/// construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    series: BTreeMap<SeriesName, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn get(&self, name: SeriesName) -> Option<&IndicatorSeries> {
        self.series.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorSeries> {
        self.series.values()
    }

    pub fn names(&self) -> impl Iterator<Item = SeriesName> + '_ {
        self.series.keys().copied()
    }

    fn insert(&mut self, name: SeriesName, values: Vec<Option<f64>>) {
        self.series.insert(name, IndicatorSeries::new(name, values));
    }
}

// =============================================================================
// Engine entry point
// =============================================================================

/// Compute every enabled indicator over `closes`.
///
/// Fails without producing any series when the parameters are invalid, a
/// close is non-finite, or the input is shorter than the minimum window of
/// any enabled indicator.
pub fn compute(
    closes: &[f64],
    enabled: &EnabledIndicators,
    params: &IndicatorParams,
) -> Result<IndicatorSet, DashboardError> {
    params.validate()?;

    if let Some(pos) = closes.iter().position(|c| !c.is_finite()) {
        return Err(DashboardError::computation(format!(
            "close at index {pos} is not a finite number"
        )));
    }

    for &kind in enabled {
        let required = params.min_required(kind);
        if closes.len() < required {
            return Err(DashboardError::InsufficientData {
                indicator: kind,
                required,
                actual: closes.len(),
            });
        }
    }

    let mut set = IndicatorSet::default();

    if enabled.contains(&IndicatorKind::Rsi) {
        set.insert(SeriesName::Rsi, rsi::calculate_rsi(closes, params.rsi_window));
    }

    if enabled.contains(&IndicatorKind::Macd) {
        let out = macd::calculate_macd(closes, params.macd_fast, params.macd_slow, params.macd_signal);
        set.insert(SeriesName::Macd, out.macd);
        set.insert(SeriesName::MacdSignal, out.signal);
    }

    if enabled.contains(&IndicatorKind::Bollinger) {
        let out = bollinger::calculate_bollinger(closes, params.bb_window, params.bb_std_dev);
        set.insert(SeriesName::BbUpper, out.upper);
        set.insert(SeriesName::BbMiddle, out.middle);
        set.insert(SeriesName::BbLower, out.lower);
    }

    debug!(
        closes = closes.len(),
        enabled = ?enabled,
        series = ?set.names().collect::<Vec<_>>(),
        "indicator set computed"
    );

    Ok(set)
}
