// =============================================================================
// Shared types used across the dashboard backend
// =============================================================================

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One of the indicators the dashboard can overlay on a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    Rsi,
    Macd,
    Bollinger,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 3] = [Self::Rsi, Self::Macd, Self::Bollinger];
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsi => write!(f, "RSI"),
            Self::Macd => write!(f, "MACD"),
            Self::Bollinger => write!(f, "BOLLINGER"),
        }
    }
}

/// The set of indicators switched on for one render pass.
pub type EnabledIndicators = BTreeSet<IndicatorKind>;

/// Name of a single output series inside an indicator set.
///
/// Serialised with the labels the front end keys its charts on
/// (`RSI`, `MACD`, `MACD_signal`, `BB_upper`, `BB_middle`, `BB_lower`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeriesName {
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "MACD_signal")]
    MacdSignal,
    #[serde(rename = "BB_upper")]
    BbUpper,
    #[serde(rename = "BB_middle")]
    BbMiddle,
    #[serde(rename = "BB_lower")]
    BbLower,
}

impl SeriesName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::MacdSignal => "MACD_signal",
            Self::BbUpper => "BB_upper",
            Self::BbMiddle => "BB_middle",
            Self::BbLower => "BB_lower",
        }
    }
}

impl std::fmt::Display for SeriesName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
