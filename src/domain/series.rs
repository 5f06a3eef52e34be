//! Price series for one symbol.

use crate::domain::error::SwingscanError;
use crate::domain::ohlcv::OhlcvBar;

/// Chronological bars for a single symbol. Dates are strictly increasing.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, SwingscanError> {
        let symbol = symbol.into();
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(SwingscanError::UnorderedSeries {
                symbol,
                date: pair[1].date,
            });
        }
        Ok(Self { symbol, bars })
    }

    /// Sorts the bars by date first. Duplicate dates are still rejected.
    pub fn from_unsorted(
        symbol: impl Into<String>,
        mut bars: Vec<OhlcvBar>,
    ) -> Result<Self, SwingscanError> {
        bars.sort_by_key(|b| b.date);
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcvBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    /// Close of the bar `offset` sessions after the first one.
    pub fn close_at(&self, offset: usize) -> Option<f64> {
        self.bars.get(offset).map(|b| b.close)
    }

    pub fn require_bars(&self, minimum: usize) -> Result<(), SwingscanError> {
        if self.bars.len() < minimum {
            return Err(SwingscanError::InsufficientData {
                symbol: self.symbol.clone(),
                bars: self.bars.len(),
                minimum,
            });
        }
        Ok(())
    }
}
