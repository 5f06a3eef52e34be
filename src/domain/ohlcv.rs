//! OHLCV bar representation.

use chrono::NaiveDate;
use serde::Serialize;

/// One trading session of a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Session direction judged by close against open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl OhlcvBar {
    pub fn trend(&self) -> Trend {
        if self.close > self.open {
            Trend::Up
        } else if self.close < self.open {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    /// Intraday change from open to close, in percent of the open.
    pub fn day_change_pct(&self) -> f64 {
        (self.close - self.open) / self.open * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar(open: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 50_000,
        }
    }

    #[test]
    fn trend_up_when_close_above_open() {
        assert_eq!(sample_bar(100.0, 105.0).trend(), Trend::Up);
    }

    #[test]
    fn trend_down_when_close_below_open() {
        assert_eq!(sample_bar(100.0, 95.0).trend(), Trend::Down);
    }

    #[test]
    fn trend_flat_when_unchanged() {
        assert_eq!(sample_bar(100.0, 100.0).trend(), Trend::Flat);
    }

    #[test]
    fn day_change_pct() {
        // (105 - 100) / 100 * 100 = 5
        assert!((sample_bar(100.0, 105.0).day_change_pct() - 5.0).abs() < 1e-12);
        assert!((sample_bar(200.0, 190.0).day_change_pct() + 5.0).abs() < 1e-12);
    }
}
