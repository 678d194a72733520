// =============================================================================
// Dashboard Pipeline: one render pass
// =============================================================================
//
// load → compute → assemble → headlines, strictly in that order.
//
// Price and indicator failures end the pass with no partial dashboard. Feed
// failures only shrink the headline list. Every pass runs inside its own
// `dashboard_pass` span so its log lines can be grouped by `pass_id`.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::assembler::{assemble, RenderSpec};
use super::selector::FetchRequest;
use crate::error::DashboardError;
use crate::indicators;
use crate::market_data::{MarketDataProvider, PriceSeriesLoader};
use crate::news::{fetch_headlines, FeedFetcher, Headline};
use crate::runtime_config::{DashboardConfig, WidgetConfig};
use crate::types::EnabledIndicators;

/// The whole page for one symbol and range.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub symbol: String,
    pub display_name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub enabled: EnabledIndicators,
    pub charts: RenderSpec,
    pub widgets: WidgetConfig,
    pub headlines: Vec<Headline>,
}

pub struct DashboardPipeline {
    loader: PriceSeriesLoader,
    feeds: Arc<dyn FeedFetcher>,
}

impl DashboardPipeline {
    pub fn new(provider: Arc<dyn MarketDataProvider>, feeds: Arc<dyn FeedFetcher>) -> Self {
        Self {
            loader: PriceSeriesLoader::new(provider),
            feeds,
        }
    }

    /// Run a full pass for `request` against a configuration snapshot.
    pub async fn render(
        &self,
        config: &DashboardConfig,
        request: &FetchRequest,
    ) -> Result<DashboardView, DashboardError> {
        let pass_id = Uuid::new_v4();
        let span = info_span!(
            "dashboard_pass",
            %pass_id,
            symbol = %request.symbol,
            start = %request.start,
            end = %request.end,
        );

        async move {
            let started = Instant::now();
            let result = self.run_pass(config, request).await;
            match &result {
                Ok(view) => info!(
                    candles = view.charts.candlestick.dates.len(),
                    line_charts = view.charts.line_charts.len(),
                    headlines = view.headlines.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "pass complete"
                ),
                Err(e) => warn!(kind = e.kind(), error = %e, "pass aborted"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_pass(
        &self,
        config: &DashboardConfig,
        request: &FetchRequest,
    ) -> Result<DashboardView, DashboardError> {
        let display_name = config
            .symbol(&request.symbol)
            .map(|s| s.display_name.clone())
            .ok_or_else(|| DashboardError::UnsupportedSymbol(request.symbol.clone()))?;

        let prices = self
            .loader
            .load(config, &request.symbol, request.start, request.end)
            .await?;

        let set = indicators::compute(&prices.closes(), &request.enabled, &config.indicator_params)?;
        let charts = assemble(&prices, &set);

        let headlines = self.headlines(config).await;

        Ok(DashboardView {
            title: config.page_title.clone(),
            symbol: request.symbol.clone(),
            display_name,
            start: request.start,
            end: request.end,
            enabled: request.enabled.clone(),
            charts,
            widgets: config.widgets.clone(),
            headlines,
        })
    }

    /// Headlines from every configured feed. Never fails.
    pub async fn headlines(&self, config: &DashboardConfig) -> Vec<Headline> {
        fetch_headlines(self.feeds.as_ref(), &config.news.feeds, config.news.limit_per_feed).await
    }
}
