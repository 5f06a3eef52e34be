//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_report;
#[cfg(feature = "web")]
pub mod web;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;

use crate::domain::analysis::SharedDataPort;
use crate::domain::error::SwingscanError;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_CSV_DIR: &str = "data";

/// Select the market data source named by `[data] source` (default `csv`).
pub fn build_data_port(config: &dyn ConfigPort) -> Result<Arc<SharedDataPort>, SwingscanError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());

    match source.trim() {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string());
            tracing::debug!(dir = %dir, "using CSV market data");
            Ok(Arc::new(csv_adapter::CsvAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "yahoo")]
        "yahoo" => {
            tracing::debug!("using Yahoo Finance market data");
            Ok(Arc::new(yahoo_adapter::YahooAdapter::new()?))
        }
        #[cfg(not(feature = "yahoo"))]
        "yahoo" => Err(SwingscanError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: "built without the `yahoo` feature".to_string(),
        }),
        other => Err(SwingscanError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{other}'"),
        }),
    }
}
