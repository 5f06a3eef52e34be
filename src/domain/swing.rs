//! Swing-trade backtest engine.
//!
//! Enters at the first session's close and walks the series forward with a
//! stop-loss and a ratcheting target. Each target touch raises the stop
//! (first to breakeven, then to the target just reached) and lifts the
//! target by another `target_pct`. The first stop-loss touch closes the
//! trade. The stop check runs before the target check on every bar.

use crate::domain::error::SwingscanError;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;

pub const MIN_SWING_BARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwingStatus {
    Hit,
    Open,
}

/// Final state of one simulated trade. Prices are unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct SwingOutcome {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub status: SwingStatus,
    pub profit: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub latest_close: f64,
    pub ratchets: usize,
}

/// Position state for a single call; never shared between symbols.
#[derive(Debug, Clone, Copy)]
struct PositionState {
    is_open: bool,
    entry_price: f64,
    stop_loss: f64,
    target: f64,
    trail_armed: bool,
    ratchets: usize,
}

impl PositionState {
    fn open(entry_price: f64, stop_loss_pct: f64, target_pct: f64) -> Self {
        Self {
            is_open: true,
            entry_price,
            stop_loss: entry_price * (1.0 - stop_loss_pct / 100.0),
            target: entry_price * (1.0 + target_pct / 100.0),
            trail_armed: false,
            ratchets: 0,
        }
    }

    fn ratchet(&mut self, target_pct: f64) {
        self.stop_loss = if self.trail_armed {
            self.target
        } else {
            self.entry_price
        };
        self.trail_armed = true;
        self.target *= 1.0 + target_pct / 100.0;
        self.ratchets += 1;
    }
}

fn validate_pct(name: &'static str, value: f64) -> Result<(), SwingscanError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SwingscanError::InvalidParameter {
            name,
            value,
            expected: "a positive percentage",
        });
    }
    Ok(())
}

/// Rejects non-positive or non-finite percentages before any data is fetched.
pub fn validate_swing_params(stop_loss_pct: f64, target_pct: f64) -> Result<(), SwingscanError> {
    validate_pct("stop_loss_percent", stop_loss_pct)?;
    validate_pct("target_percent", target_pct)
}

pub fn run_backtest(
    series: &PriceSeries,
    stop_loss_pct: f64,
    target_pct: f64,
) -> Result<SwingOutcome, SwingscanError> {
    validate_swing_params(stop_loss_pct, target_pct)?;
    series.require_bars(MIN_SWING_BARS)?;

    let bars = series.bars();
    let entry_bar = &bars[0];
    let latest_close = bars[bars.len() - 1].close;
    let mut state = PositionState::open(entry_bar.close, stop_loss_pct, target_pct);

    for bar in &bars[1..] {
        if bar.low <= state.stop_loss {
            state.is_open = false;
            let exit_price = state.stop_loss;
            return Ok(SwingOutcome {
                symbol: series.symbol().to_string(),
                entry_date: entry_bar.date,
                entry_price: state.entry_price,
                exit_date: Some(bar.date),
                exit_price: Some(exit_price),
                status: SwingStatus::Hit,
                profit: exit_price - state.entry_price,
                stop_loss: state.stop_loss,
                target: state.target,
                latest_close,
                ratchets: state.ratchets,
            });
        }
        if bar.high >= state.target {
            state.ratchet(target_pct);
        }
    }

    debug_assert!(state.is_open);
    Ok(SwingOutcome {
        symbol: series.symbol().to_string(),
        entry_date: entry_bar.date,
        entry_price: state.entry_price,
        exit_date: None,
        exit_price: None,
        status: SwingStatus::Open,
        profit: latest_close - state.entry_price,
        stop_loss: state.stop_loss,
        target: state.target,
        latest_close,
        ratchets: state.ratchets,
    })
}
