//! Market data access port.

use crate::domain::error::SwingscanError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;

/// Source of daily equity bars. Unknown symbols and provider outages surface
/// as `SwingscanError::DataUnavailable`.
pub trait MarketDataPort {
    /// Sessions in `[start_date, end_date]`, oldest first.
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SwingscanError>;

    /// The most recent session the provider knows about.
    fn fetch_latest_bar(&self, symbol: &str) -> Result<OhlcvBar, SwingscanError>;

    fn list_symbols(&self) -> Result<Vec<String>, SwingscanError>;
}
