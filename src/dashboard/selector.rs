// =============================================================================
// Input Selector: user controls to a validated fetch request
// =============================================================================
//
// Controls arrive as optional query parameters. Missing values fall back to
// the configured defaults: first configured symbol, the last
// `default_lookback_days` ending today, and the default indicator toggles.

use chrono::{Days, NaiveDate};
use serde::Deserialize;

use crate::error::DashboardError;
use crate::runtime_config::DashboardConfig;
use crate::types::{EnabledIndicators, IndicatorKind};

/// Raw control values as sent by the UI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub rsi: Option<bool>,
    #[serde(default)]
    pub macd: Option<bool>,
    #[serde(default)]
    pub bollinger: Option<bool>,
}

/// A fully resolved request for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub enabled: EnabledIndicators,
}

/// Resolve `query` against `config`. `today` anchors the default range.
pub fn resolve(
    config: &DashboardConfig,
    query: &DashboardQuery,
    today: NaiveDate,
) -> Result<FetchRequest, DashboardError> {
    let symbol = match query.symbol.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => config
            .symbol(s)
            .ok_or_else(|| DashboardError::UnsupportedSymbol(s.to_string()))?
            .symbol
            .clone(),
        _ => config
            .symbols
            .first()
            .ok_or_else(|| DashboardError::UnsupportedSymbol(String::new()))?
            .symbol
            .clone(),
    };

    let end = query.end.unwrap_or(today);
    let start = match query.start {
        Some(start) => start,
        None => end
            .checked_sub_days(Days::new(u64::from(config.default_lookback_days)))
            .unwrap_or(NaiveDate::MIN),
    };
    if start > end {
        return Err(DashboardError::InvalidDateRange { start, end });
    }

    let mut enabled = config.default_indicators.to_enabled();
    let overrides = [
        (IndicatorKind::Rsi, query.rsi),
        (IndicatorKind::Macd, query.macd),
        (IndicatorKind::Bollinger, query.bollinger),
    ];
    for (kind, toggle) in overrides {
        match toggle {
            Some(true) => {
                enabled.insert(kind);
            }
            Some(false) => {
                enabled.remove(&kind);
            }
            None => {}
        }
    }

    Ok(FetchRequest {
        symbol,
        start,
        end,
        enabled,
    })
}
