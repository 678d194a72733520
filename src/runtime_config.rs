// =============================================================================
// Runtime Configuration: Dashboard settings with atomic save
// =============================================================================
//
// Every tunable of the dashboard lives here: the supported symbol set, the
// default control values, indicator windows, provider and feed settings, and
// the static placeholder widgets.
//
// All fields carry `#[serde(default)]` so that a partial (or empty) JSON file
// still loads. Persistence uses an atomic tmp + rename pattern.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::IndicatorParams;
use crate::types::{EnabledIndicators, IndicatorKind};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_page_title() -> String {
    "XRP & HBAR Market Monitor".to_string()
}

fn default_symbols() -> Vec<SymbolConfig> {
    vec![
        SymbolConfig {
            symbol: "XRP-USD".to_string(),
            display_name: "XRP".to_string(),
        },
        SymbolConfig {
            symbol: "HBAR-USD".to_string(),
            display_name: "Hedera (HBAR)".to_string(),
        },
    ]
}

fn default_lookback_days() -> u32 {
    90
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_feeds() -> Vec<String> {
    vec![
        "https://www.coindesk.com/arc/outboundfeeds/rss/".to_string(),
        "https://cointelegraph.com/rss".to_string(),
    ]
}

fn default_limit_per_feed() -> usize {
    5
}

fn default_whale_widget() -> MetricWidget {
    MetricWidget {
        label: "Recent whale transactions".to_string(),
        value: "12 over 1M USD".to_string(),
        progress: 0.6,
    }
}

fn default_tvl_widget() -> MetricWidget {
    MetricWidget {
        label: "Total Value Locked (TVL)".to_string(),
        value: "$128M".to_string(),
        progress: 0.8,
    }
}

fn default_sentiment_notes() -> Vec<SentimentNote> {
    vec![
        SentimentNote {
            account: "@hedera".to_string(),
            text: "HBAR reaches new highs!".to_string(),
            sentiment: "Positive".to_string(),
        },
        SentimentNote {
            account: "@Ripple".to_string(),
            text: "XRP ETF news soon? Stay tuned!".to_string(),
            sentiment: "Optimistic".to_string(),
        },
    ]
}

fn default_breaking_news() -> String {
    "BREAKING: XRP included in Grayscale fund. HBAR partnership with Lloyds Bank confirmed."
        .to_string()
}

// =============================================================================
// Sections
// =============================================================================

/// One entry of the supported symbol set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolConfig {
    /// Provider ticker, e.g. "XRP-USD".
    pub symbol: String,
    /// Label shown in the symbol selector.
    pub display_name: String,
}

/// Initial state of the three indicator toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorToggles {
    #[serde(default = "default_true")]
    pub rsi: bool,
    #[serde(default = "default_true")]
    pub macd: bool,
    #[serde(default)]
    pub bollinger: bool,
}

impl Default for IndicatorToggles {
    fn default() -> Self {
        Self {
            rsi: true,
            macd: true,
            bollinger: false,
        }
    }
}

impl IndicatorToggles {
    pub fn to_enabled(&self) -> EnabledIndicators {
        IndicatorKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                IndicatorKind::Rsi => self.rsi,
                IndicatorKind::Macd => self.macd,
                IndicatorKind::Bollinger => self.bollinger,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the chart API.
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Request timeout; a hung provider fails the pass after this long.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// RSS / Atom feed URLs, read in order.
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,

    #[serde(default = "default_limit_per_feed")]
    pub limit_per_feed: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            limit_per_feed: default_limit_per_feed(),
        }
    }
}

/// A static metric tile with a progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricWidget {
    pub label: String,
    pub value: String,
    /// Fill fraction of the progress bar, in [0, 1].
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentNote {
    pub account: String,
    pub text: String,
    pub sentiment: String,
}

/// Placeholder widgets. None of these values are computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_whale_widget")]
    pub whale_transactions: MetricWidget,

    #[serde(default = "default_tvl_widget")]
    pub tvl: MetricWidget,

    #[serde(default = "default_sentiment_notes")]
    pub sentiment: Vec<SentimentNote>,

    #[serde(default = "default_breaking_news")]
    pub breaking_news: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            whale_transactions: default_whale_widget(),
            tvl: default_tvl_widget(),
            sentiment: default_sentiment_notes(),
            breaking_news: default_breaking_news(),
        }
    }
}

// =============================================================================
// DashboardConfig
// =============================================================================

/// Top-level configuration for the dashboard backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_page_title")]
    pub page_title: String,

    /// Supported symbols. Requests for anything else are rejected.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<SymbolConfig>,

    /// Width of the default date range ending today.
    #[serde(default = "default_lookback_days")]
    pub default_lookback_days: u32,

    #[serde(default)]
    pub default_indicators: IndicatorToggles,

    #[serde(default)]
    pub indicator_params: IndicatorParams,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub widgets: WidgetConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_title: default_page_title(),
            symbols: default_symbols(),
            default_lookback_days: default_lookback_days(),
            default_indicators: IndicatorToggles::default(),
            indicator_params: IndicatorParams::default(),
            provider: ProviderConfig::default(),
            news: NewsConfig::default(),
            widgets: WidgetConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Look up a configured symbol (exact, case-sensitive ticker match).
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolConfig> {
        self.symbols.iter().find(|s| s.symbol == symbol)
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid dashboard config in {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols.len(),
            feeds = config.news.feeds.len(),
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise dashboard config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "dashboard config saved (atomic)");
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            anyhow::bail!("at least one symbol must be configured");
        }
        if self.default_lookback_days == 0 {
            anyhow::bail!("default_lookback_days must be positive");
        }
        if self.provider.timeout_secs == 0 {
            anyhow::bail!("provider.timeout_secs must be positive");
        }
        for widget in [&self.widgets.whale_transactions, &self.widgets.tvl] {
            if !(0.0..=1.0).contains(&widget.progress) {
                anyhow::bail!(
                    "widget '{}' progress {} is outside [0, 1]",
                    widget.label,
                    widget.progress
                );
            }
        }
        self.indicator_params
            .validate()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(())
    }
}
