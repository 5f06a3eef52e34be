//! HTTP request handlers for the JSON API.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::json_report::{
    batch_json, reversal_report_json, snapshot_json, swing_outcome_json, volume_summary_json,
};
use crate::domain::analysis::{
    BacktestRequest, ReversalRequest, SnapshotRequest, VolumeTrendRequest, analyze_reversals,
    backtest_symbols, snapshot_symbols, volume_trend_symbols,
};
use crate::domain::config_validation::DATE_FORMAT;
use crate::domain::error::SwingscanError;
use crate::domain::reversal::{DEFAULT_NUM_REVERSALS, DEFAULT_TOLERANCE_PCT};

use super::{AppState, ApiError};

type JsonObject = Map<String, Value>;

/// Anything that is not a JSON object is a server-side failure, not a
/// validation error.
fn parse_body(body: &Bytes) -> Result<JsonObject, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::internal("request body must be a JSON object")),
        Err(e) => Err(ApiError::internal(format!("invalid JSON: {e}"))),
    }
}

fn require<'a>(body: &'a JsonObject, key: &str) -> Result<&'a Value, SwingscanError> {
    body.get(key).ok_or_else(|| SwingscanError::missing_key(key))
}

/// `null` counts as absent.
fn optional<'a>(body: &'a JsonObject, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| !v.is_null())
}

fn invalid_field(key: &str, reason: &str) -> SwingscanError {
    SwingscanError::InvalidField {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn symbols_field(value: &Value, key: &str) -> Result<Vec<String>, SwingscanError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid_field(key, "expected an array of symbols"))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| invalid_field(key, "symbols must be strings"))
        })
        .collect()
}

fn parse_date(raw: &str, key: &str) -> Result<NaiveDate, SwingscanError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| invalid_field(key, "expected a YYYY-MM-DD date"))
}

fn date_field(value: &Value, key: &str) -> Result<NaiveDate, SwingscanError> {
    let raw = value
        .as_str()
        .ok_or_else(|| invalid_field(key, "expected a YYYY-MM-DD date"))?;
    parse_date(raw, key)
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn number_field(value: &Value, key: &str) -> Result<f64, SwingscanError> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid_field(key, "expected a number"))
}

fn parse_number(raw: &str, key: &str) -> Result<f64, SwingscanError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid_field(key, "expected a number"))
}

async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(format!("worker failed: {e}")))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn backtest(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;

    let symbols = require(&body, "symbols")?;
    let start_date = require(&body, "start_date")?;
    let stop_loss = require(&body, "stop_loss_percent")?;
    let target = require(&body, "target_percent")?;

    let req = BacktestRequest {
        symbols: symbols_field(symbols, "symbols")?,
        start_date: date_field(start_date, "start_date")?,
        end_date: optional(&body, "end_date")
            .map(|v| date_field(v, "end_date"))
            .transpose()?,
        stop_loss_pct: number_field(stop_loss, "stop_loss_percent")?,
        target_pct: number_field(target, "target_percent")?,
    };
    tracing::info!(symbols = req.symbols.len(), start = %req.start_date, "backtest request");

    let port = Arc::clone(&state.data_port);
    let results = run_blocking(move || backtest_symbols(port.as_ref(), &req)).await??;
    Ok(Json(batch_json(&results, swing_outcome_json)))
}

pub async fn reversal(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let param = |key: &str| params.get(key).filter(|v| !v.trim().is_empty());

    let ticker = param("ticker")
        .ok_or_else(|| SwingscanError::missing_key("ticker"))?
        .trim()
        .to_string();
    let start_date = param("start_date").ok_or_else(|| SwingscanError::missing_key("start_date"))?;

    let tolerance_pct = match param("tolerance_percentage") {
        Some(raw) => parse_number(raw, "tolerance_percentage")?,
        None => state
            .config
            .get_double("reversal", "tolerance_percentage", DEFAULT_TOLERANCE_PCT),
    };
    let num_reversals = match param("num_reversals") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid_field("num_reversals", "expected a non-negative integer"))?,
        None => state
            .config
            .get_int("reversal", "num_reversals", DEFAULT_NUM_REVERSALS as i64)
            .max(0) as usize,
    };
    let range_width = match param("range_width") {
        Some(raw) => Some(parse_number(raw, "range_width")?),
        None => state
            .config
            .get_string("reversal", "range_width")
            .and_then(|raw| raw.trim().parse().ok()),
    };

    let req = ReversalRequest {
        ticker,
        start_date: parse_date(start_date, "start_date")?,
        end_date: param("end_date")
            .map(|raw| parse_date(raw, "end_date"))
            .transpose()?,
        tolerance_pct,
        num_reversals,
        range_width,
    };
    tracing::info!(ticker = %req.ticker, tolerance_pct, num_reversals, "reversal request");

    let port = Arc::clone(&state.data_port);
    let report = run_blocking(move || analyze_reversals(port.as_ref(), &req)).await??;
    Ok(Json(reversal_report_json(&report)))
}

pub async fn stock_data(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;

    let symbols = require(&body, "symbols")?;
    let req = SnapshotRequest {
        symbols: symbols_field(symbols, "symbols")?,
        date: optional(&body, "date")
            .map(|v| date_field(v, "date"))
            .transpose()?,
        investment: optional(&body, "investment")
            .map(|v| number_field(v, "investment"))
            .transpose()?,
    };
    tracing::info!(symbols = req.symbols.len(), date = ?req.date, "snapshot request");

    let port = Arc::clone(&state.data_port);
    let results = run_blocking(move || snapshot_symbols(port.as_ref(), &req)).await??;
    Ok(Json(batch_json(&results, snapshot_json)))
}

pub async fn volume_trend(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;

    let symbols = require(&body, "symbols")?;
    let start_date = require(&body, "start_date")?;
    let only_higher = match optional(&body, "only_higher") {
        None => false,
        Some(v) => v
            .as_bool()
            .ok_or_else(|| invalid_field("only_higher", "expected a boolean"))?,
    };

    let req = VolumeTrendRequest {
        symbols: symbols_field(symbols, "symbols")?,
        start_date: date_field(start_date, "start_date")?,
        end_date: optional(&body, "end_date")
            .map(|v| date_field(v, "end_date"))
            .transpose()?,
        only_higher,
    };
    tracing::info!(symbols = req.symbols.len(), only_higher, "volume trend request");

    let port = Arc::clone(&state.data_port);
    let results = run_blocking(move || volume_trend_symbols(port.as_ref(), &req)).await?;
    Ok(Json(batch_json(&results, volume_summary_json)))
}

pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not found")
}
