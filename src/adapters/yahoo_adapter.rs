//! Yahoo Finance chart API adapter.
//!
//! Fetches daily bars from the public v8 chart endpoint with a blocking
//! client. Rows where any price or the volume is null (halted sessions,
//! the in-progress day) are skipped.

use crate::domain::error::SwingscanError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::series::PriceSeries;
use crate::ports::data_port::MarketDataPort;
use chrono::{DateTime, Duration, NaiveDate};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Calendar days looked back when only the most recent session is wanted.
const LATEST_LOOKBACK_DAYS: i64 = 14;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, SwingscanError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SwingscanError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("swingscan/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SwingscanError::Provider {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn request_body(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<String, SwingscanError> {
        let period1 = unix_midnight(start_date);
        // period2 is exclusive
        let period2 = unix_midnight(end_date + Duration::days(1));
        let url = format!("{}/{}", self.base_url, symbol);

        tracing::debug!(symbol, %start_date, %end_date, "requesting chart data");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .map_err(|e| SwingscanError::data_unavailable(symbol, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwingscanError::data_unavailable(
                symbol,
                format!("HTTP {status}"),
            ));
        }

        response
            .text()
            .map_err(|e| SwingscanError::data_unavailable(symbol, format!("read failed: {e}")))
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Decode a chart response body into a sorted series.
fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, SwingscanError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| SwingscanError::Provider {
            reason: format!("failed to decode chart for {symbol}: {e}"),
        })?;

    if let Some(err) = response.chart.error {
        return Err(SwingscanError::data_unavailable(
            symbol,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let data = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| SwingscanError::data_unavailable(symbol, "empty chart result"))?;

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return PriceSeries::new(symbol, Vec::new());
    };

    let mut bars = Vec::with_capacity(data.timestamp.len());
    for (i, ts) in data.timestamp.iter().enumerate() {
        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            continue;
        };
        let Some(moment) = DateTime::from_timestamp(ts + offset, 0) else {
            continue;
        };
        bars.push(OhlcvBar {
            date: moment.date_naive(),
            open,
            high,
            low,
            close,
            volume,
        });
    }

    // Intraday refreshes can repeat the current session; keep the last one.
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    PriceSeries::from_unsorted(symbol, bars)
}

impl MarketDataPort for YahooAdapter {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SwingscanError> {
        let body = self.request_body(symbol, start_date, end_date)?;
        let series = parse_chart(symbol, &body)?;
        let bars = series
            .bars()
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect();
        PriceSeries::new(symbol, bars)
    }

    fn fetch_latest_bar(&self, symbol: &str) -> Result<OhlcvBar, SwingscanError> {
        let end = crate::domain::analysis::today();
        let series =
            self.fetch_daily_bars(symbol, end - Duration::days(LATEST_LOOKBACK_DAYS), end)?;
        series
            .last()
            .cloned()
            .ok_or_else(|| SwingscanError::data_unavailable(symbol, "no recent sessions"))
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingscanError> {
        Err(SwingscanError::Provider {
            reason: "the yahoo source cannot enumerate symbols".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "TCS.NS", "gmtoffset": 19800},
                "timestamp": [1704944700, 1705031100, 1705290300],
                "indicators": {
                    "quote": [{
                        "open":   [3700.0, 3710.0, 3800.0],
                        "high":   [3750.0, null,   3900.0],
                        "low":    [3680.0, 3690.0, 3790.0],
                        "close":  [3720.0, 3730.0, 3880.0],
                        "volume": [1000,   1100,   2000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parse_chart_skips_null_rows_and_uses_exchange_dates() {
        let series = parse_chart("TCS.NS", SAMPLE).unwrap();
        assert_eq!(series.len(), 2);

        let first = series.first().unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(first.close, 3720.0);
        assert_eq!(first.volume, 1000);

        let last = series.last().unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(last.high, 3900.0);
    }

    #[test]
    fn parse_chart_reports_api_error_as_unavailable() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("GONE.NS", body).unwrap_err();
        assert!(matches!(err, SwingscanError::DataUnavailable { .. }));
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn parse_chart_rejects_garbage() {
        let err = parse_chart("TCS.NS", "<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, SwingscanError::Provider { .. }));
    }

    #[test]
    fn parse_chart_handles_missing_timestamps() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let series = parse_chart("NEW.NS", body).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn unix_midnight_is_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(unix_midnight(date), 1_704_067_200);
    }
}
