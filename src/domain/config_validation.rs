//! Configuration validation.
//!
//! Validates config sections before a command runs. Absent optional keys
//! are accepted; present keys must parse and be in range.

use crate::domain::error::SwingscanError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    match config.get_string("data", "source").as_deref() {
        None | Some("csv") | Some("yahoo") => Ok(()),
        Some(other) => Err(invalid(
            "data",
            "source",
            format!("unknown source '{other}' (expected csv or yahoo)"),
        )),
    }
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    validate_date(config, "backtest", "start_date")?;
    validate_date(config, "backtest", "end_date")?;
    validate_date_order(config, "backtest")?;
    validate_positive(config, "backtest", "stop_loss_percent")?;
    validate_positive(config, "backtest", "target_percent")?;
    Ok(())
}

pub fn validate_reversal_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    validate_date(config, "reversal", "start_date")?;
    validate_date(config, "reversal", "end_date")?;
    validate_date_order(config, "reversal")?;
    validate_non_negative(config, "reversal", "tolerance_percentage")?;
    if config.get_string("reversal", "num_reversals").is_some()
        && config.get_int("reversal", "num_reversals", -1) < 0
    {
        return Err(invalid(
            "reversal",
            "num_reversals",
            "num_reversals must be a non-negative integer",
        ));
    }
    if config.get_string("reversal", "range_width").is_some()
        && config.get_double("reversal", "range_width", 0.0) < 1.0
    {
        return Err(invalid("reversal", "range_width", "range_width must be at least 1"));
    }
    Ok(())
}

pub fn validate_snapshot_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    validate_date(config, "snapshot", "date")?;
    validate_positive(config, "snapshot", "investment")?;
    Ok(())
}

pub fn validate_volume_trend_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    validate_date(config, "volume_trend", "start_date")?;
    validate_date(config, "volume_trend", "end_date")?;
    validate_date_order(config, "volume_trend")?;
    if let Some(raw) = config.get_string("volume_trend", "only_higher") {
        let known = config.get_bool("volume_trend", "only_higher", true)
            == config.get_bool("volume_trend", "only_higher", false);
        if !known {
            return Err(invalid(
                "volume_trend",
                "only_higher",
                format!("'{raw}' is not a boolean"),
            ));
        }
    }
    Ok(())
}

/// Parse an optional `YYYY-MM-DD` value.
pub fn get_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, SwingscanError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| invalid(section, key, "invalid date format (expected YYYY-MM-DD)")),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SwingscanError {
    SwingscanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_date(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), SwingscanError> {
    get_date(config, section, key).map(|_| ())
}

fn validate_date_order(config: &dyn ConfigPort, section: &str) -> Result<(), SwingscanError> {
    let start = get_date(config, section, "start_date")?;
    let end = get_date(config, section, "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid(section, "start_date", "start_date must be before end_date"));
        }
    }
    Ok(())
}

fn validate_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), SwingscanError> {
    if config.get_string(section, key).is_none() {
        return Ok(());
    }
    let value = config.get_double(section, key, f64::NAN);
    if value.is_nan() || value <= 0.0 {
        return Err(invalid(section, key, format!("{key} must be positive")));
    }
    Ok(())
}

fn validate_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), SwingscanError> {
    if config.get_string(section, key).is_none() {
        return Ok(());
    }
    let value = config.get_double(section, key, f64::NAN);
    if value.is_nan() || value < 0.0 {
        return Err(invalid(section, key, format!("{key} must be non-negative")));
    }
    Ok(())
}
