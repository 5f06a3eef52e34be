//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for swingscan.
#[derive(Debug, thiserror::Error)]
pub enum SwingscanError {
    #[error("Missing key '{key}' in JSON data")]
    MissingKey { key: String },

    #[error("invalid value for '{key}': {reason}")]
    InvalidField { key: String, reason: String },

    #[error("no data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("invalid parameter {name} = {value}: must be {expected}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("price series for {symbol} is not strictly increasing at {date}")]
    UnorderedSeries { symbol: String, date: NaiveDate },

    #[error("market data provider error: {reason}")]
    Provider { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SwingscanError {
    pub fn missing_key(key: &str) -> Self {
        SwingscanError::MissingKey { key: key.into() }
    }

    pub fn data_unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        SwingscanError::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

impl From<&SwingscanError> for std::process::ExitCode {
    fn from(err: &SwingscanError) -> Self {
        let code: u8 = match err {
            SwingscanError::Io(_) => 1,
            SwingscanError::ConfigParse { .. }
            | SwingscanError::ConfigMissing { .. }
            | SwingscanError::ConfigInvalid { .. } => 2,
            SwingscanError::Provider { .. } => 3,
            SwingscanError::MissingKey { .. }
            | SwingscanError::InvalidField { .. }
            | SwingscanError::InvalidParameter { .. } => 4,
            SwingscanError::DataUnavailable { .. }
            | SwingscanError::InsufficientData { .. }
            | SwingscanError::UnorderedSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_matches_api_contract() {
        let err = SwingscanError::missing_key("symbols");
        assert_eq!(err.to_string(), "Missing key 'symbols' in JSON data");
    }

    #[test]
    fn invalid_parameter_names_the_parameter() {
        let err = SwingscanError::InvalidParameter {
            name: "stop_loss_percent",
            value: -1.0,
            expected: "positive",
        };
        let msg = err.to_string();
        assert!(msg.contains("stop_loss_percent"));
        assert!(msg.contains("-1"));
    }

    #[test]
    fn data_unavailable_is_per_symbol() {
        let err = SwingscanError::data_unavailable("TCS.NS", "no rows");
        assert_eq!(err.to_string(), "no data available for TCS.NS: no rows");
    }
}
