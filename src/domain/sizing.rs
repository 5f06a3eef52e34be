//! Fixed-investment position sizing.
//!
//! A fixed cash amount buys as many whole shares as it can at the entry
//! price.

use crate::domain::error::SwingscanError;

#[derive(Debug, Clone, PartialEq)]
pub struct SizedPosition {
    pub quantity: i64,
    pub entry_price: f64,
    pub invested_amount: f64,
}

impl SizedPosition {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price)
    }

    /// Profit relative to the amount actually invested; zero when nothing
    /// could be bought.
    pub fn unrealized_pnl_pct(&self, price: f64) -> f64 {
        if self.invested_amount > 0.0 {
            self.unrealized_pnl(price) / self.invested_amount * 100.0
        } else {
            0.0
        }
    }
}

pub fn size_position(investment: f64, entry_price: f64) -> Result<SizedPosition, SwingscanError> {
    if !investment.is_finite() || investment <= 0.0 {
        return Err(SwingscanError::InvalidParameter {
            name: "investment",
            value: investment,
            expected: "a positive amount",
        });
    }
    if !entry_price.is_finite() || entry_price <= 0.0 {
        return Err(SwingscanError::InvalidParameter {
            name: "entry_price",
            value: entry_price,
            expected: "a positive price",
        });
    }

    let quantity = (investment / entry_price).floor() as i64;
    let invested_amount = quantity as f64 * entry_price;
    Ok(SizedPosition {
        quantity,
        entry_price,
        invested_amount,
    })
}
