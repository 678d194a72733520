pub mod loader;
pub mod price_series;
pub mod provider;

// Re-exports for convenient access (e.g. `use crate::market_data::PriceSeries`).
pub use loader::PriceSeriesLoader;
pub use price_series::PriceSeries;
pub use provider::{MarketDataProvider, YahooClient};
