//! Order side (buy or sell).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Basis points per unit.
const BPS_PER_UNIT: i64 = 10_000;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Shift a reference price by `bps` in the direction that makes an order
    /// on this side more marketable.
    ///
    /// Buy = price above the reference, Sell = price below it.
    #[must_use]
    pub fn marketable_price(&self, reference: Decimal, bps: u32) -> Decimal {
        let offset = reference * Decimal::from(bps) / Decimal::from(BPS_PER_UNIT);
        match self {
            Self::Buy => reference + offset,
            Self::Sell => reference - offset,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}
