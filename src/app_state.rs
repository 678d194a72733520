// =============================================================================
// Central Application State: dashboard server
// =============================================================================
//
// Holds the one piece of shared mutable state (the configuration) and the
// pipeline that every request runs. A pass never touches the lock after it
// starts: handlers clone a snapshot up front and render from that.
//
// Thread safety:
//   - parking_lot::RwLock around the configuration.
//   - The pipeline is immutable; its provider and feed fetcher are shared
//     behind `Arc`.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::info;

use crate::dashboard::DashboardPipeline;
use crate::market_data::MarketDataProvider;
use crate::news::FeedFetcher;
use crate::runtime_config::DashboardConfig;

/// Shared across all handlers via `Arc<AppState>`.
pub struct AppState {
    pub config: RwLock<DashboardConfig>,
    /// File the configuration was loaded from and is reloaded from.
    pub config_path: PathBuf,
    pub pipeline: DashboardPipeline,
    /// Instant when the server was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(
        config: DashboardConfig,
        config_path: impl Into<PathBuf>,
        provider: Arc<dyn MarketDataProvider>,
        feeds: Arc<dyn FeedFetcher>,
    ) -> Self {
        Self {
            config: RwLock::new(config),
            config_path: config_path.into(),
            pipeline: DashboardPipeline::new(provider, feeds),
            start_time: std::time::Instant::now(),
        }
    }

    /// Clone the current configuration for the duration of one pass.
    pub fn config_snapshot(&self) -> DashboardConfig {
        self.config.read().clone()
    }

    /// Re-read the configuration file. On any error the running
    /// configuration is left untouched.
    pub fn reload_config(&self) -> Result<DashboardConfig> {
        let fresh = DashboardConfig::load(&self.config_path)?;
        *self.config.write() = fresh.clone();
        info!(path = %self.config_path.display(), "configuration reloaded");
        Ok(fresh)
    }

    /// Apply `update` under the write lock and return the new configuration.
    ///
    /// `update` reports whether it changed anything; if so the file is
    /// rewritten before the lock is released, so saves land on disk in the
    /// same order as the updates. A failed save keeps the in-memory change.
    pub fn update_config(
        &self,
        update: impl FnOnce(&mut DashboardConfig) -> bool,
    ) -> Result<DashboardConfig> {
        let mut config = self.config.write();
        if update(&mut config) {
            config.save(&self.config_path)?;
        }
        Ok(config.clone())
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
