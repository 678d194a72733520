use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A provider row before cleaning. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBar {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl RawBar {
    /// Convert to a `PricePoint` if every field is present and finite.
    pub fn complete(&self) -> Option<PricePoint> {
        let point = PricePoint {
            date: self.date?,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume?,
        };
        let finite = [point.open, point.high, point.low, point.close]
            .iter()
            .all(|v| v.is_finite());
        finite.then_some(point)
    }
}

// ---------------------------------------------------------------------------
// PriceSeries
// ---------------------------------------------------------------------------

/// Cleaned price history of one symbol.
///
/// Always non-empty with strictly ascending dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting empty input and out-of-order or duplicate
    /// dates. Callers that can explain *why* a series is empty (the loader)
    /// report `EmptyResult` themselves before getting here.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, DashboardError> {
        let symbol = symbol.into();
        if points.is_empty() {
            return Err(DashboardError::ProviderShape(format!("{symbol}: empty series")));
        }

        if let Some(w) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(DashboardError::ProviderShape(format!(
                "{symbol}: dates not strictly ascending ({} then {})",
                w[0].date, w[1].date
            )));
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }

    pub fn last_close(&self) -> f64 {
        self.points[self.points.len() - 1].close
    }
}
