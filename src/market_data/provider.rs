// =============================================================================
// Market Data Provider: Yahoo Finance chart API
// =============================================================================
//
// The provider is the only place that talks to the outside world for prices.
// It returns raw rows exactly as received (missing fields stay missing); the
// loader is responsible for cleaning and validating them.
//
// Response layout of GET /v8/finance/chart/{symbol}:
//   chart.result[i].meta.symbol
//   chart.result[i].meta.gmtoffset
//   chart.result[i].timestamp[]
//   chart.result[i].indicators.quote[0].{open,high,low,close,volume}[]
// Any quote entry may be `null`.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::price_series::RawBar;
use crate::runtime_config::ProviderConfig;

/// Raw rows for one symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSeries {
    pub symbol: String,
    pub bars: Vec<RawBar>,
}

/// Everything the provider answered for one request.
///
/// A well-formed answer holds exactly one series; the loader rejects
/// anything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    pub series: Vec<ProviderSeries>,
}

/// Source of daily OHLCV rows.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars for `symbol` in the half-open range `[start, end_exclusive)`.
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<ProviderResponse>;
}

// =============================================================================
// Yahoo Finance client
// =============================================================================

#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent("Mozilla/5.0 (krypto-dash)")
            .build()
            .context("failed to build reqwest client for YahooClient")?;

        debug!(base_url = %config.base_url, "YahooClient initialised");

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_daily")]
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<ProviderResponse> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end_exclusive.and_time(NaiveTime::MIN).and_utc().timestamp();
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url, symbol, period1, period2
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol} request failed"))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .context("failed to parse chart response body")?;

        // Yahoo signals "no rows" with an error object (404 for an unknown
        // range, 400 "Data doesn't exist" for a future one) instead of an
        // empty result; that is not a transport failure.
        if chart_reports_no_data(&body) {
            debug!(symbol, %status, "provider reports no data");
            return Ok(ProviderResponse::default());
        }

        if !status.is_success() {
            anyhow::bail!("chart API returned {}: {}", status, body);
        }

        let response = parse_chart_response(&body)?;
        debug!(
            symbol,
            series = response.series.len(),
            rows = response.series.iter().map(|s| s.bars.len()).sum::<usize>(),
            "chart fetched"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

fn chart_reports_no_data(body: &Value) -> bool {
    let err = &body["chart"]["error"];
    if err["code"].as_str() == Some("Not Found") {
        return true;
    }
    err["description"]
        .as_str()
        .map(|d| d.to_ascii_lowercase())
        .is_some_and(|d| d.contains("data doesn't exist") || d.contains("no data found"))
}

/// Parse a chart API body into raw per-symbol rows.
pub fn parse_chart_response(body: &Value) -> Result<ProviderResponse> {
    let chart = body
        .get("chart")
        .context("chart response missing 'chart' object")?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        if chart_reports_no_data(body) {
            return Ok(ProviderResponse::default());
        }
        anyhow::bail!("chart API error: {err}");
    }

    let results = match chart.get("result") {
        None | Some(Value::Null) => return Ok(ProviderResponse::default()),
        Some(v) => v.as_array().context("chart.result is not an array")?,
    };

    let mut series = Vec::with_capacity(results.len());
    for result in results {
        series.push(parse_result(result)?);
    }

    Ok(ProviderResponse { series })
}

fn parse_result(result: &Value) -> Result<ProviderSeries> {
    let symbol = result["meta"]["symbol"]
        .as_str()
        .context("chart result missing meta.symbol")?
        .to_string();
    let gmtoffset = result["meta"]["gmtoffset"].as_i64().unwrap_or(0);

    let Some(timestamps) = result.get("timestamp").and_then(Value::as_array) else {
        // Yahoo omits the timestamp array entirely for an empty range.
        return Ok(ProviderSeries {
            symbol,
            bars: Vec::new(),
        });
    };

    let quote = &result["indicators"]["quote"][0];
    let column = |name: &str| quote.get(name).and_then(Value::as_array);
    let (opens, highs, lows, closes, volumes) = (
        column("open"),
        column("high"),
        column("low"),
        column("close"),
        column("volume"),
    );

    let cell = |col: Option<&Vec<Value>>, i: usize| col.and_then(|c| c.get(i)).and_then(Value::as_f64);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let date = ts
            .as_i64()
            .and_then(|t| DateTime::from_timestamp(t + gmtoffset, 0))
            .map(|dt| dt.date_naive());
        if date.is_none() {
            warn!(symbol = %symbol, index = i, "skipping row with invalid timestamp");
        }

        let volume = volumes
            .and_then(|c| c.get(i))
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)));

        bars.push(RawBar {
            date,
            open: cell(opens, i),
            high: cell(highs, i),
            low: cell(lows, i),
            close: cell(closes, i),
            volume,
        });
    }

    Ok(ProviderSeries { symbol, bars })
}

// =============================================================================
// In-memory provider for tests
// =============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a canned response and records how often it was asked.
    pub struct InMemoryProvider {
        response: std::result::Result<ProviderResponse, String>,
        pub calls: AtomicUsize,
    }

    impl InMemoryProvider {
        pub fn with_bars(symbol: &str, bars: Vec<RawBar>) -> Self {
            Self::with_response(ProviderResponse {
                series: vec![ProviderSeries {
                    symbol: symbol.to_string(),
                    bars,
                }],
            })
        }

        pub fn with_response(response: ProviderResponse) -> Self {
            Self {
                response: Ok(response),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for InMemoryProvider {
        async fn fetch_daily(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end_exclusive: NaiveDate,
        ) -> Result<ProviderResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(r) => Ok(r.clone()),
                Err(msg) => Err(anyhow::anyhow!(msg.clone())),
            }
        }
    }

    /// `n` consecutive daily bars starting 2024-01-01 with the given closes.
    pub fn daily_bars(closes: &[f64]) -> Vec<RawBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| RawBar {
                date: Some(start + chrono::Days::new(i as u64)),
                open: Some(c),
                high: Some(c * 1.01),
                low: Some(c * 0.99),
                close: Some(c),
                volume: Some(1_000 + i as u64),
            })
            .collect()
    }
}
