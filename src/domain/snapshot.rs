//! Point-in-time price snapshots.
//!
//! A latest snapshot describes the most recent session. A dated snapshot
//! anchors on the first session at or after a requested date and reports
//! the closes a fixed number of sessions later, plus the move to the
//! latest close.

use crate::domain::error::SwingscanError;
use crate::domain::numeric::pct_change;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::series::PriceSeries;
use crate::domain::sizing::{size_position, SizedPosition};
use chrono::NaiveDate;

/// Calendar days fetched after the anchor date; comfortably covers six
/// sessions across weekends and short holidays.
pub const SNAPSHOT_WINDOW_DAYS: i64 = 15;

pub const NEXT_DAY_OFFSET: usize = 1;
pub const THIRD_DAY_OFFSET: usize = 2;
pub const SIXTH_DAY_OFFSET: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct LatestSnapshot {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub day_change_pct: f64,
}

impl LatestSnapshot {
    pub fn from_bar(bar: &OhlcvBar) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
            close: bar.close,
            day_change_pct: bar.day_change_pct(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatedSnapshot {
    pub date: NaiveDate,
    pub date_price: f64,
    pub latest_price: f64,
    pub next_day: Option<f64>,
    pub third_trading_day: Option<f64>,
    pub sixth_trading_day: Option<f64>,
    pub position: Option<SizedPosition>,
}

impl DatedSnapshot {
    pub fn change_pct(&self) -> f64 {
        pct_change(self.date_price, self.latest_price)
    }

    pub fn next_day_change_pct(&self) -> Option<f64> {
        self.next_day.map(|c| pct_change(self.date_price, c))
    }

    pub fn third_day_change_pct(&self) -> Option<f64> {
        self.third_trading_day.map(|c| pct_change(self.date_price, c))
    }

    pub fn sixth_day_change_pct(&self) -> Option<f64> {
        self.sixth_trading_day.map(|c| pct_change(self.date_price, c))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Latest(LatestSnapshot),
    Dated(DatedSnapshot),
}

/// `window` starts at the anchor date; `latest` is the most recent session.
pub fn dated_snapshot(
    window: &PriceSeries,
    latest: &OhlcvBar,
    investment: Option<f64>,
) -> Result<DatedSnapshot, SwingscanError> {
    let anchor = window
        .first()
        .ok_or_else(|| SwingscanError::data_unavailable(window.symbol(), "no sessions in window"))?;

    let position = investment
        .map(|amount| size_position(amount, anchor.close))
        .transpose()?;

    Ok(DatedSnapshot {
        date: anchor.date,
        date_price: anchor.close,
        latest_price: latest.close,
        next_day: window.close_at(NEXT_DAY_OFFSET),
        third_trading_day: window.close_at(THIRD_DAY_OFFSET),
        sixth_trading_day: window.close_at(SIXTH_DAY_OFFSET),
        position,
    })
}
