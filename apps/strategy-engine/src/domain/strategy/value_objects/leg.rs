//! A single exchange order submitted on behalf of a strategy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::order_execution::{OrderSide, OrderStatus, OrderType};
use crate::domain::shared::ExchangeOrderId;

/// Role a leg plays within its strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegRole {
    /// Bracket entry order.
    Entry,
    /// Take-profit exit.
    TakeProfit,
    /// Stop-loss exit.
    StopLoss,
    /// TWAP chunk (1-based index).
    Chunk(u32),
}

impl fmt::Display for LegRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::TakeProfit => write!(f, "take_profit"),
            Self::StopLoss => write!(f, "stop_loss"),
            Self::Chunk(n) => write!(f, "chunk_{n}"),
        }
    }
}

/// An order as requested by the strategy and, once submitted, as
/// acknowledged by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// Role within the strategy.
    pub role: LegRole,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Exchange order ID; `None` if submission failed.
    pub exchange_order_id: Option<ExchangeOrderId>,
    /// Requested quantity.
    pub requested_quantity: Decimal,
    /// Limit price.
    pub requested_price: Option<Decimal>,
    /// Trigger price.
    pub stop_price: Option<Decimal>,
    /// Quantity reported as executed.
    pub executed_quantity: Decimal,
    /// Status from the most recent acknowledgement or poll.
    pub last_known_status: Option<OrderStatus>,
    /// When the leg was created.
    pub submitted_at: DateTime<Utc>,
}

impl Leg {
    /// Create an unsubmitted leg.
    #[must_use]
    pub fn new(role: LegRole, side: OrderSide, order_type: OrderType, quantity: Decimal) -> Self {
        Self {
            role,
            side,
            order_type,
            exchange_order_id: None,
            requested_quantity: quantity,
            requested_price: None,
            stop_price: None,
            executed_quantity: Decimal::ZERO,
            last_known_status: None,
            submitted_at: Utc::now(),
        }
    }

    /// Set the limit price.
    #[must_use]
    pub const fn with_price(mut self, price: Decimal) -> Self {
        self.requested_price = Some(price);
        self
    }

    /// Set the trigger price.
    #[must_use]
    pub const fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    /// Record the exchange acknowledgement.
    pub fn mark_placed(
        &mut self,
        order_id: ExchangeOrderId,
        status: OrderStatus,
        executed_quantity: Option<Decimal>,
    ) {
        self.exchange_order_id = Some(order_id);
        self.last_known_status = Some(status);
        if let Some(qty) = executed_quantity {
            self.executed_quantity = qty;
        }
    }

    /// Whether the exchange accepted this leg.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.exchange_order_id.is_some()
    }

    /// Whether this leg is placed and may still execute.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.is_placed() && self.last_known_status.is_none_or(|s| !s.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn role_display() {
        assert_eq!(LegRole::TakeProfit.to_string(), "take_profit");
        assert_eq!(LegRole::StopLoss.to_string(), "stop_loss");
        assert_eq!(LegRole::Entry.to_string(), "entry");
        assert_eq!(LegRole::Chunk(3).to_string(), "chunk_3");
    }

    #[test]
    fn unsubmitted_leg_is_not_live() {
        let leg = Leg::new(LegRole::StopLoss, OrderSide::Sell, OrderType::Stop, dec!(1))
            .with_price(dec!(28855))
            .with_stop_price(dec!(29000));
        assert!(!leg.is_placed());
        assert!(!leg.is_live());
        assert_eq!(leg.requested_price, Some(dec!(28855)));
        assert_eq!(leg.stop_price, Some(dec!(29000)));
    }

    #[test]
    fn placed_leg_tracks_status() {
        let mut leg = Leg::new(LegRole::TakeProfit, OrderSide::Sell, OrderType::TakeProfit, dec!(1));
        leg.mark_placed(ExchangeOrderId::new("1"), OrderStatus::New, None);
        assert!(leg.is_live());
        assert_eq!(leg.executed_quantity, Decimal::ZERO);

        leg.mark_placed(ExchangeOrderId::new("1"), OrderStatus::Filled, Some(dec!(1)));
        assert!(!leg.is_live());
        assert_eq!(leg.executed_quantity, dec!(1));
    }
}
