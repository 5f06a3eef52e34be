//! JSON rendering of analysis results.
//!
//! Shared by the HTTP handlers and the CLI `--json` output so both speak
//! the same wire format. Rounding to 2 decimals happens here and nowhere
//! else.

use crate::domain::analysis::ReversalReport;
use crate::domain::batch::SymbolResult;
use crate::domain::numeric::{format2, round2};
use crate::domain::snapshot::{DatedSnapshot, LatestSnapshot, Snapshot};
use crate::domain::swing::SwingOutcome;
use crate::domain::volume_trend::TrendVolumeSummary;
use serde_json::{json, Map, Value};

/// `{symbol: value | {"error": message}}`, keyed by display symbol.
pub fn batch_json<T>(results: &[SymbolResult<T>], render: impl Fn(&T) -> Value) -> Value {
    let mut map = Map::new();
    for entry in results {
        let value = match &entry.result {
            Ok(v) => render(v),
            Err(e) => json!({ "error": e.to_string() }),
        };
        map.insert(entry.display_symbol(), value);
    }
    Value::Object(map)
}

pub fn swing_outcome_json(outcome: &SwingOutcome) -> Value {
    json!({
        "entry_date": outcome.entry_date.to_string(),
        "entry_price": round2(outcome.entry_price),
        "exit_date": outcome.exit_date.map(|d| d.to_string()),
        "exit_price": outcome.exit_price.map(round2),
        "status": outcome.status,
        "profit": round2(outcome.profit),
        "stop_loss": round2(outcome.stop_loss),
        "target": round2(outcome.target),
        "latest_close": round2(outcome.latest_close),
        "ratchets": outcome.ratchets,
    })
}

pub fn reversal_report_json(report: &ReversalReport) -> Value {
    let points: Vec<Value> = report
        .levels
        .iter()
        .map(|c| json!([round2(c.price), c.count]))
        .collect();

    let mut map = Map::new();
    map.insert("ticker".into(), json!(report.ticker));
    map.insert("reversal_points".into(), Value::Array(points));
    for (period, value) in &report.sma {
        map.insert(format!("{period}SMA"), json!(format2(*value)));
    }
    map.insert("volume_trend".into(), volume_summary_json(&report.volume));
    if let Some(ranges) = &report.ranges {
        let ranges: Vec<Value> = ranges
            .iter()
            .map(|r| json!({ "range": r.label(), "count": r.count }))
            .collect();
        map.insert("reversal_ranges".into(), Value::Array(ranges));
    }
    Value::Object(map)
}

pub fn volume_summary_json(summary: &TrendVolumeSummary) -> Value {
    json!({
        "avg_volume_uptrend": summary.avg_volume_uptrend.map(round2),
        "avg_volume_downtrend": summary.avg_volume_downtrend.map(round2),
        "uptrend_volumes": summary.uptrend_volumes,
        "downtrend_volumes": summary.downtrend_volumes,
        "higher_volume_uptrend": summary.higher_volume_uptrend,
        "percentage_higher": summary.percentage_higher,
    })
}

pub fn snapshot_json(snapshot: &Snapshot) -> Value {
    match snapshot {
        Snapshot::Latest(latest) => latest_snapshot_json(latest),
        Snapshot::Dated(dated) => dated_snapshot_json(dated),
    }
}

fn latest_snapshot_json(s: &LatestSnapshot) -> Value {
    json!({
        "open": format2(s.open),
        "close": format2(s.close),
        "day_change_percentage": format2(s.day_change_pct),
    })
}

fn opt2(value: Option<f64>) -> Value {
    value.map_or(Value::Null, |v| Value::String(format2(v)))
}

fn dated_snapshot_json(s: &DatedSnapshot) -> Value {
    let mut value = json!({
        "date_price": format2(s.date_price),
        "latest_price": format2(s.latest_price),
        "change_percentage": format2(s.change_pct()),
        "next_day": opt2(s.next_day),
        "third_trading_day": opt2(s.third_trading_day),
        "sixth_trading_day": opt2(s.sixth_trading_day),
        "next_day_change_percentage": opt2(s.next_day_change_pct()),
        "third_day_change_percentage": opt2(s.third_day_change_pct()),
        "sixth_day_change_percentage": opt2(s.sixth_day_change_pct()),
    });

    if let (Some(position), Value::Object(map)) = (&s.position, &mut value) {
        map.insert("quantity".into(), json!(position.quantity));
        map.insert(
            "invested_amount".into(),
            json!(format2(position.invested_amount)),
        );
        map.insert(
            "current_value".into(),
            json!(format2(position.market_value(s.latest_price))),
        );
        map.insert(
            "profit".into(),
            json!(format2(position.unrealized_pnl(s.latest_price))),
        );
        map.insert(
            "profit_percentage".into(),
            json!(format2(position.unrealized_pnl_pct(s.latest_price))),
        );
    }
    value
}
