//! Fetch-then-compute pipelines shared by the CLI and the HTTP API.
//!
//! Each pipeline pulls bars through a [`MarketDataPort`] and hands them to
//! one engine. Multi-symbol pipelines go through [`run_per_symbol`] so a
//! failing symbol is reported in place.

use crate::domain::batch::{run_per_symbol, SymbolResult};
use crate::domain::error::SwingscanError;
use crate::domain::indicator::sma::{recent_sma, RECENT_SMA_PERIODS};
use crate::domain::reversal::{
    find_reversal_ranges, find_reversals, ReversalCandidate, ReversalRange,
};
use crate::domain::snapshot::{dated_snapshot, LatestSnapshot, Snapshot, SNAPSHOT_WINDOW_DAYS};
use crate::domain::swing::{run_backtest, validate_swing_params, SwingOutcome};
use crate::domain::volume_trend::{classify_volume_trend, TrendVolumeSummary};
use crate::ports::data_port::MarketDataPort;
use chrono::{Duration, NaiveDate};

pub type SharedDataPort = dyn MarketDataPort + Send + Sync;

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub stop_loss_pct: f64,
    pub target_pct: f64,
}

/// Bad percentages fail the whole request; anything else is per symbol.
pub fn backtest_symbols(
    port: &SharedDataPort,
    req: &BacktestRequest,
) -> Result<Vec<SymbolResult<SwingOutcome>>, SwingscanError> {
    validate_swing_params(req.stop_loss_pct, req.target_pct)?;
    let end_date = req.end_date.unwrap_or_else(today);
    Ok(run_per_symbol(&req.symbols, |symbol| {
        let series = port.fetch_daily_bars(symbol, req.start_date, end_date)?;
        tracing::debug!(symbol, bars = series.len(), "running swing backtest");
        run_backtest(&series, req.stop_loss_pct, req.target_pct)
    }))
}

#[derive(Debug, Clone)]
pub struct ReversalRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub tolerance_pct: f64,
    pub num_reversals: usize,
    pub range_width: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ReversalReport {
    pub ticker: String,
    pub levels: Vec<ReversalCandidate>,
    pub ranges: Option<Vec<ReversalRange>>,
    /// `(period, latest SMA)` for each of the recent SMA periods.
    pub sma: Vec<(usize, f64)>,
    pub volume: TrendVolumeSummary,
}

pub fn analyze_reversals(
    port: &SharedDataPort,
    req: &ReversalRequest,
) -> Result<ReversalReport, SwingscanError> {
    let end_date = req.end_date.unwrap_or_else(today);
    let series = port.fetch_daily_bars(&req.ticker, req.start_date, end_date)?;
    if series.is_empty() {
        return Err(SwingscanError::data_unavailable(
            &req.ticker,
            format!("no sessions between {} and {}", req.start_date, end_date),
        ));
    }
    let bars = series.bars();

    // Ranges see every cluster; only the reported levels are truncated.
    let mut levels = find_reversals(bars, req.tolerance_pct, usize::MAX)?;
    let ranges = req
        .range_width
        .map(|width| find_reversal_ranges(&levels, width))
        .transpose()?;
    levels.truncate(req.num_reversals);
    let sma = RECENT_SMA_PERIODS
        .iter()
        .filter_map(|&period| recent_sma(bars, period).map(|v| (period, v)))
        .collect();

    Ok(ReversalReport {
        ticker: req.ticker.clone(),
        levels,
        ranges,
        sma,
        volume: classify_volume_trend(bars),
    })
}

#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    pub symbols: Vec<String>,
    pub date: Option<NaiveDate>,
    pub investment: Option<f64>,
}

pub fn snapshot_symbols(
    port: &SharedDataPort,
    req: &SnapshotRequest,
) -> Result<Vec<SymbolResult<Snapshot>>, SwingscanError> {
    if let Some(investment) = req.investment {
        if !investment.is_finite() || investment <= 0.0 {
            return Err(SwingscanError::InvalidParameter {
                name: "investment",
                value: investment,
                expected: "a positive amount",
            });
        }
    }
    Ok(run_per_symbol(&req.symbols, |symbol| {
        let latest = port.fetch_latest_bar(symbol)?;
        match req.date {
            None => Ok(Snapshot::Latest(LatestSnapshot::from_bar(&latest))),
            Some(date) => {
                let window = port.fetch_daily_bars(
                    symbol,
                    date,
                    date + Duration::days(SNAPSHOT_WINDOW_DAYS),
                )?;
                dated_snapshot(&window, &latest, req.investment).map(Snapshot::Dated)
            }
        }
    }))
}

#[derive(Debug, Clone)]
pub struct VolumeTrendRequest {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub only_higher: bool,
}

/// With `only_higher`, successful symbols whose uptrend volume is not higher
/// are dropped; errors are always kept.
pub fn volume_trend_symbols(
    port: &SharedDataPort,
    req: &VolumeTrendRequest,
) -> Vec<SymbolResult<TrendVolumeSummary>> {
    let end_date = req.end_date.unwrap_or_else(today);
    let mut results = run_per_symbol(&req.symbols, |symbol| {
        let series = port.fetch_daily_bars(symbol, req.start_date, end_date)?;
        if series.is_empty() {
            return Err(SwingscanError::data_unavailable(symbol, "no sessions fetched"));
        }
        Ok(classify_volume_trend(series.bars()))
    });
    if req.only_higher {
        results.retain(|r| match &r.result {
            Ok(summary) => summary.higher_volume_uptrend,
            Err(_) => true,
        });
    }
    results
}
