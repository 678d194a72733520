// =============================================================================
// Error taxonomy for a dashboard render pass
// =============================================================================
//
// Price and indicator errors are terminal for the pass that raised them.
// Feed errors have their own type because they never leave the news module.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::IndicatorKind;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Symbol is not one of the configured symbols.
    #[error("unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// The provider returned no usable rows for the symbol and range.
    #[error("no price data for {symbol} between {start} and {end}")]
    EmptyResult {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("insufficient data for {indicator}: need {required} closes, got {actual}")]
    InsufficientData {
        indicator: IndicatorKind,
        required: usize,
        actual: usize,
    },

    /// Malformed input or parameters for the indicator engine.
    #[error("indicator computation failed: {0}")]
    IndicatorComputation(String),

    /// The provider answered with something other than one series for the
    /// requested symbol.
    #[error("unexpected provider response shape: {0}")]
    ProviderShape(String),

    #[error("market data provider error: {0:#}")]
    Provider(#[from] anyhow::Error),
}

impl DashboardError {
    /// Stable machine-readable tag for API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedSymbol(_) => "UnsupportedSymbol",
            Self::InvalidDateRange { .. } => "InvalidDateRange",
            Self::EmptyResult { .. } => "EmptyResultError",
            Self::InsufficientData { .. } => "InsufficientDataError",
            Self::IndicatorComputation(_) => "IndicatorComputationError",
            Self::ProviderShape(_) => "ProviderShapeError",
            Self::Provider(_) => "ProviderError",
        }
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::IndicatorComputation(msg.into())
    }
}

/// A single feed could not be downloaded or parsed.
#[derive(Debug, Error)]
pub enum FeedParseError {
    #[error("failed to fetch feed {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("malformed feed document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed feed attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("feed document ended with {open} element(s) still open")]
    Truncated { open: usize },

    #[error("document is neither RSS nor Atom (root element <{0}>)")]
    UnknownFormat(String),
}
