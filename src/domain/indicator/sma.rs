//! Simple Moving Average of closing prices.
//!
//! SMA(n)[i] = mean(C[max(0, i-n+1)..=i])
//! Early bars average over the closes available so far (a minimum window of
//! one), so every point has a value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const RECENT_SMA_PERIODS: [usize; 3] = [20, 50, 200];

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let period = period.max(1);
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }
        let window_len = (i + 1).min(period);

        values.push(IndicatorPoint {
            date: bar.date,
            value: window_sum / window_len as f64,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

/// Latest SMA value, or `None` for an empty series.
pub fn recent_sma(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    calculate_sma(bars, period).latest()
}
