// =============================================================================
// Price Series Loader: fetch, clean, validate
// =============================================================================
//
// Turns a provider answer into a `PriceSeries`:
//   1. ask the provider for the closed range [start, end]
//      (the provider's upper bound is exclusive, so request end + 1 day)
//   2. require exactly one series, for the requested symbol
//   3. drop rows with any missing or non-finite field
//   4. sort by date and keep the last row of a duplicated date
//   5. fail with `EmptyResult` when nothing is left
//
// Nothing is cached: every call goes to the provider.
// =============================================================================

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, info, instrument, warn};

use super::price_series::{PricePoint, PriceSeries};
use super::provider::MarketDataProvider;
use crate::error::DashboardError;
use crate::runtime_config::DashboardConfig;

pub struct PriceSeriesLoader {
    provider: Arc<dyn MarketDataProvider>,
}

impl PriceSeriesLoader {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Load the cleaned daily series of `symbol` for `[start, end]`.
    #[instrument(skip(self, config), name = "loader::load")]
    pub async fn load(
        &self,
        config: &DashboardConfig,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DashboardError> {
        if config.symbol(symbol).is_none() {
            return Err(DashboardError::UnsupportedSymbol(symbol.to_string()));
        }
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }

        let end_exclusive = end
            .checked_add_days(Days::new(1))
            .ok_or(DashboardError::InvalidDateRange { start, end })?;

        let response = self.provider.fetch_daily(symbol, start, end_exclusive).await?;

        let raw = match response.series.len() {
            0 => Vec::new(),
            1 => {
                let series = response.series.into_iter().next().unwrap_or_default();
                if !series.symbol.eq_ignore_ascii_case(symbol) {
                    return Err(DashboardError::ProviderShape(format!(
                        "asked for {symbol}, provider answered for {}",
                        series.symbol
                    )));
                }
                series.bars
            }
            n => {
                return Err(DashboardError::ProviderShape(format!(
                    "expected a single series for {symbol}, provider returned {n}"
                )));
            }
        };

        let received = raw.len();
        let points = clean(raw.iter().filter_map(|bar| bar.complete()), start, end);
        let dropped = received - points.len();
        if dropped > 0 {
            debug!(symbol, received, dropped, "dropped incomplete or out-of-range rows");
        }

        if points.is_empty() {
            warn!(symbol, %start, %end, received, "no usable price rows");
            return Err(DashboardError::EmptyResult {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        let series = PriceSeries::new(symbol, points)?;
        info!(
            symbol,
            rows = series.len(),
            first = %series.first_date(),
            last = %series.last_date(),
            "price series loaded"
        );
        Ok(series)
    }
}

/// Sort complete rows by date, keep the last row per date and drop rows
/// outside `[start, end]`.
fn clean(rows: impl Iterator<Item = PricePoint>, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = rows.filter(|p| p.date >= start && p.date <= end).collect();
    // Stable sort keeps provider order among equal dates.
    points.sort_by_key(|p| p.date);

    let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
    for p in points {
        match out.last_mut() {
            Some(last) if last.date == p.date => *last = p,
            _ => out.push(p),
        }
    }
    out
}
