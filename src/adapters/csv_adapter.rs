//! CSV file market data adapter.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with a header row and
//! columns `date,open,high,low,close,volume`.

use crate::domain::error::SwingscanError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::series::PriceSeries;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Symbols arrive from HTTP bodies and queries, so anything that could
    /// name a file outside `base_path` is refused before the join.
    fn csv_path(&self, symbol: &str) -> Result<PathBuf, SwingscanError> {
        if symbol.is_empty()
            || symbol.contains(['/', '\\', '\0'])
            || symbol.contains("..")
        {
            return Err(SwingscanError::data_unavailable(
                symbol,
                "symbol is not a valid file name",
            ));
        }
        Ok(self.base_path.join(format!("{}.csv", symbol)))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, SwingscanError> {
        let path = self.csv_path(symbol)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            SwingscanError::data_unavailable(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SwingscanError::Provider {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = column(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SwingscanError::Provider {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            bars.push(OhlcvBar {
                date,
                open: parse_column(&record, 1, "open")?,
                high: parse_column(&record, 2, "high")?,
                low: parse_column(&record, 3, "low")?,
                close: parse_column(&record, 4, "close")?,
                volume: parse_column(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn column<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, SwingscanError> {
    record.get(index).ok_or_else(|| SwingscanError::Provider {
        reason: format!("missing {} column", name),
    })
}

fn parse_column<T>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, SwingscanError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    column(record, index, name)?
        .trim()
        .parse()
        .map_err(|e| SwingscanError::Provider {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl MarketDataPort for CsvAdapter {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SwingscanError> {
        let bars = self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        PriceSeries::new(symbol, bars)
    }

    fn fetch_latest_bar(&self, symbol: &str) -> Result<OhlcvBar, SwingscanError> {
        self.read_all(symbol)?
            .pop()
            .ok_or_else(|| SwingscanError::data_unavailable(symbol, "file has no rows"))
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingscanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SwingscanError::Provider {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SwingscanError::Provider {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
