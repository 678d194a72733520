// =============================================================================
// Presentation Assembler: series to chart specifications
// =============================================================================
//
// Pure data transformation. The candlestick chart always exists; one line
// chart is emitted per indicator series present in the set, tagged with the
// panel it belongs to so the UI can overlay MACD with its signal line and
// the three Bollinger bands. A missing series simply produces no chart.

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::rsi::rsi_zone;
use crate::indicators::IndicatorSet;
use crate::market_data::PriceSeries;
use crate::types::SeriesName;

const CANDLESTICK_HEIGHT: u32 = 400;
const INDICATOR_HEIGHT: u32 = 300;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickSpec {
    pub title: String,
    pub height: u32,
    pub range_slider: bool,
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChartSpec {
    /// Chart group; series sharing a panel are drawn on the same axes.
    pub panel: &'static str,
    pub series: SeriesName,
    pub label: &'static str,
    pub height: u32,
    pub dates: Vec<NaiveDate>,
    /// `null` during the warm-up period.
    pub values: Vec<Option<f64>>,
}

/// Most recent readings, for the headline numbers above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReadings {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi_zone: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
}

/// Everything the chart area of the page needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSpec {
    pub candlestick: CandlestickSpec,
    pub line_charts: Vec<LineChartSpec>,
    pub latest: LatestReadings,
}

fn panel_and_label(name: SeriesName) -> (&'static str, &'static str) {
    match name {
        SeriesName::Rsi => ("RSI", "RSI"),
        SeriesName::Macd => ("MACD", "MACD"),
        SeriesName::MacdSignal => ("MACD", "Signal"),
        SeriesName::BbUpper => ("Bollinger", "Upper band"),
        SeriesName::BbMiddle => ("Bollinger", "Middle band"),
        SeriesName::BbLower => ("Bollinger", "Lower band"),
    }
}

pub fn assemble(prices: &PriceSeries, indicators: &IndicatorSet) -> RenderSpec {
    let points = prices.points();
    let dates = prices.dates();

    let candlestick = CandlestickSpec {
        title: format!("{} price", prices.symbol()),
        height: CANDLESTICK_HEIGHT,
        range_slider: false,
        dates: dates.clone(),
        open: points.iter().map(|p| p.open).collect(),
        high: points.iter().map(|p| p.high).collect(),
        low: points.iter().map(|p| p.low).collect(),
        close: points.iter().map(|p| p.close).collect(),
        volume: points.iter().map(|p| p.volume).collect(),
    };

    let line_charts = indicators
        .iter()
        .map(|series| {
            let (panel, label) = panel_and_label(series.name);
            LineChartSpec {
                panel,
                series: series.name,
                label,
                height: INDICATOR_HEIGHT,
                dates: dates.clone(),
                values: series.values.clone(),
            }
        })
        .collect();

    let latest_of = |name| indicators.get(name).and_then(|s| s.latest());
    let rsi = latest_of(SeriesName::Rsi);
    let latest = LatestReadings {
        date: prices.last_date(),
        close: prices.last_close(),
        rsi,
        rsi_zone: rsi.map(rsi_zone),
        macd: latest_of(SeriesName::Macd),
        macd_signal: latest_of(SeriesName::MacdSignal),
    };

    RenderSpec {
        candlestick,
        line_charts,
        latest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{compute, IndicatorParams};
    use crate::market_data::price_series::PricePoint;
    use crate::types::{EnabledIndicators, IndicatorKind};

    fn prices(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = (0..n)
            .map(|i| {
                let c = 0.5 + i as f64 * 0.01;
                PricePoint {
                    date: start + chrono::Days::new(i as u64),
                    open: c - 0.005,
                    high: c + 0.01,
                    low: c - 0.01,
                    close: c,
                    volume: 100 * i as u64,
                }
            })
            .collect();
        PriceSeries::new("XRP-USD", points).unwrap()
    }

    fn indicators(prices: &PriceSeries, kinds: &[IndicatorKind]) -> IndicatorSet {
        let enabled: EnabledIndicators = kinds.iter().copied().collect();
        compute(&prices.closes(), &enabled, &IndicatorParams::default()).unwrap()
    }

    #[test]
    fn candlestick_passes_ohlc_through_unchanged() {
        let p = prices(30);
        let render = assemble(&p, &IndicatorSet::default());
        assert_eq!(render.candlestick.dates, p.dates());
        assert_eq!(render.candlestick.close, p.closes());
        assert_eq!(render.candlestick.height, 400);
        assert!(!render.candlestick.range_slider);
        assert!(render.line_charts.is_empty());
    }

    #[test]
    fn one_line_chart_per_series_with_panels() {
        let p = prices(40);
        let render = assemble(&p, &indicators(&p, &[IndicatorKind::Rsi, IndicatorKind::Macd]));
        let names: Vec<SeriesName> = render.line_charts.iter().map(|c| c.series).collect();
        assert_eq!(names, vec![SeriesName::Rsi, SeriesName::Macd, SeriesName::MacdSignal]);
        assert_eq!(render.line_charts[1].panel, "MACD");
        assert_eq!(render.line_charts[2].label, "Signal");
        for chart in &render.line_charts {
            assert_eq!(chart.values.len(), p.len());
            assert_eq!(chart.dates.len(), p.len());
            assert_eq!(chart.height, 300);
        }
    }

    #[test]
    fn toggled_off_indicator_is_silently_omitted() {
        let p = prices(40);
        let render = assemble(&p, &indicators(&p, &[IndicatorKind::Bollinger]));
        assert_eq!(render.line_charts.len(), 3);
        assert!(render.line_charts.iter().all(|c| c.panel == "Bollinger"));
        assert!(render.latest.rsi.is_none());
        assert!(render.latest.rsi_zone.is_none());
    }

    #[test]
    fn latest_readings_reflect_last_bar() {
        let p = prices(40);
        let render = assemble(&p, &indicators(&p, &[IndicatorKind::Rsi]));
        assert_eq!(render.latest.date, p.last_date());
        assert!((render.latest.close - p.last_close()).abs() < f64::EPSILON);
        // Monotonically rising closes.
        assert_eq!(render.latest.rsi_zone, Some("OVERBOUGHT"));
    }
}
