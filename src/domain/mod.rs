//! Core domain types and logic.

pub mod ohlcv;
pub mod series;
pub mod numeric;
pub mod swing;
pub mod reversal;
pub mod volume_trend;
pub mod indicator;
pub mod snapshot;
pub mod sizing;
pub mod batch;
pub mod analysis;
pub mod config_validation;
pub mod error;
