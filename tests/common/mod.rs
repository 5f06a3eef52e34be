#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
pub use swingscan::domain::error::SwingscanError;
pub use swingscan::domain::ohlcv::OhlcvBar;
use swingscan::domain::series::PriceSeries;
use swingscan::ports::data_port::MarketDataPort;

/// In-memory data source. Unknown symbols behave like a provider with no
/// data for them.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    /// Fetches for `symbol` fail with a provider error.
    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn bars_for(&self, symbol: &str) -> Result<&Vec<OhlcvBar>, SwingscanError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingscanError::Provider {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .ok_or_else(|| SwingscanError::data_unavailable(symbol, "unknown symbol"))
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SwingscanError> {
        let bars = self
            .bars_for(symbol)?
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect();
        PriceSeries::new(symbol, bars)
    }

    fn fetch_latest_bar(&self, symbol: &str) -> Result<OhlcvBar, SwingscanError> {
        self.bars_for(symbol)?
            .last()
            .cloned()
            .ok_or_else(|| SwingscanError::data_unavailable(symbol, "no rows"))
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingscanError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(date_str: &str, open: f64, high: f64, low: f64, close: f64, volume: i64) -> OhlcvBar {
    OhlcvBar {
        date: date(date_str),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Consecutive calendar days from `start`, one bar per `(high, low, close)`.
/// Open equals the previous close (the first bar opens at its close).
pub fn bars_from_hlc(start: &str, rows: &[(f64, f64, f64)]) -> Vec<OhlcvBar> {
    let start = date(start);
    let mut prev_close = rows.first().map(|r| r.2).unwrap_or(0.0);
    rows.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| {
            let bar = OhlcvBar {
                date: start + Duration::days(i as i64),
                open: prev_close,
                high,
                low,
                close,
                volume: 1000 + i as i64 * 10,
            };
            prev_close = close;
            bar
        })
        .collect()
}

/// Bars whose lows follow `lows`; other prices sit just above.
pub fn bars_from_lows(start: &str, lows: &[f64]) -> Vec<OhlcvBar> {
    let rows: Vec<(f64, f64, f64)> = lows.iter().map(|&l| (l + 2.0, l, l + 1.0)).collect();
    bars_from_hlc(start, &rows)
}

/// `count` steadily rising bars starting at `start_price`.
pub fn generate_bars(start: &str, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let start = date(start);
    (0..count)
        .map(|i| {
            let price = start_price + i as f64 * 0.5;
            OhlcvBar {
                date: start + Duration::days(i as i64),
                open: price,
                high: price + 1.0,
                low: price - 0.5,
                close: price + 0.25,
                volume: 10_000 + i as i64 * 100,
            }
        })
        .collect()
}
