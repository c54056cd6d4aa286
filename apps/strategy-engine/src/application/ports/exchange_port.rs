//! Exchange Gateway Port (Driven Port)
//!
//! Interface for placing, inspecting and cancelling orders on a spot
//! exchange, plus the market metadata strategies need for validation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::order_execution::{OrderSide, OrderStatus, OrderType, TimeInForce};
use crate::domain::shared::{ExchangeOrderId, Symbol};
use crate::domain::strategy::Leg;

/// Request to submit an order to the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Decimal,
    /// Limit price.
    pub price: Option<Decimal>,
    /// Trigger price (stop and take-profit orders).
    pub stop_price: Option<Decimal>,
    /// Time in force; ignored for market orders.
    pub time_in_force: TimeInForce,
}

impl SubmitOrderRequest {
    /// Create the request that submits `leg`.
    #[must_use]
    pub fn for_leg(symbol: Symbol, leg: &Leg, time_in_force: TimeInForce) -> Self {
        Self {
            symbol,
            side: leg.side,
            order_type: leg.order_type,
            quantity: leg.requested_quantity,
            price: leg.requested_price,
            stop_price: leg.stop_price,
            time_in_force,
        }
    }
}

#[cfg(test)]
impl SubmitOrderRequest {
    /// Create a market order request.
    #[must_use]
    pub(crate) const fn market(symbol: Symbol, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
        }
    }

    /// Create a limit order request.
    #[must_use]
    pub(crate) const fn limit(
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol,
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
        }
    }

    /// Set time in force.
    #[must_use]
    pub(crate) const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }
}

/// Acknowledgment from the exchange for a submitted or queried order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Exchange-assigned order ID.
    pub order_id: ExchangeOrderId,
    /// Current status.
    pub status: OrderStatus,
    /// Executed quantity, when reported.
    pub executed_qty: Option<Decimal>,
    /// Average fill price, when reported.
    pub avg_price: Option<Decimal>,
}

/// Exchange gateway error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Network or transport failure.
    #[error("Exchange connection error: {message}")]
    Connection {
        /// Error details.
        message: String,
    },

    /// Order rejected by the exchange.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The missing order ID.
        order_id: String,
    },

    /// Symbol not listed on the exchange.
    #[error("Unknown symbol: {symbol}")]
    UnknownSymbol {
        /// The missing symbol.
        symbol: String,
    },

    /// No price available for the symbol.
    #[error("No price available for {symbol}")]
    PriceUnavailable {
        /// Symbol queried.
        symbol: String,
    },

    /// Rate limited.
    #[error("Rate limited by exchange")]
    RateLimited,

    /// Unknown error.
    #[error("Exchange error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

/// Port for exchange interactions.
///
/// Every call may fail and none is retried by callers.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Submit an order.
    async fn submit_order(&self, request: SubmitOrderRequest) -> Result<OrderAck, GatewayError>;

    /// Fetch the current state of an order.
    async fn get_order(
        &self,
        symbol: &Symbol,
        order_id: &ExchangeOrderId,
    ) -> Result<OrderAck, GatewayError>;

    /// Cancel an order.
    async fn cancel_order(
        &self,
        symbol: &Symbol,
        order_id: &ExchangeOrderId,
    ) -> Result<(), GatewayError>;

    /// Latest traded price for a symbol.
    async fn current_price(&self, symbol: &Symbol) -> Result<Decimal, GatewayError>;

    /// Minimum order quantity for a symbol, if the exchange enforces one.
    async fn min_quantity(&self, symbol: &Symbol) -> Result<Option<Decimal>, GatewayError>;

    /// Whether a listed symbol is currently trading.
    ///
    /// Unlisted symbols return [`GatewayError::UnknownSymbol`].
    async fn symbol_tradable(&self, symbol: &Symbol) -> Result<bool, GatewayError>;
}

#[async_trait]
impl<G: ExchangeGateway + ?Sized> ExchangeGateway for Arc<G> {
    async fn submit_order(&self, request: SubmitOrderRequest) -> Result<OrderAck, GatewayError> {
        (**self).submit_order(request).await
    }

    async fn get_order(
        &self,
        symbol: &Symbol,
        order_id: &ExchangeOrderId,
    ) -> Result<OrderAck, GatewayError> {
        (**self).get_order(symbol, order_id).await
    }

    async fn cancel_order(
        &self,
        symbol: &Symbol,
        order_id: &ExchangeOrderId,
    ) -> Result<(), GatewayError> {
        (**self).cancel_order(symbol, order_id).await
    }

    async fn current_price(&self, symbol: &Symbol) -> Result<Decimal, GatewayError> {
        (**self).current_price(symbol).await
    }

    async fn min_quantity(&self, symbol: &Symbol) -> Result<Option<Decimal>, GatewayError> {
        (**self).min_quantity(symbol).await
    }

    async fn symbol_tradable(&self, symbol: &Symbol) -> Result<bool, GatewayError> {
        (**self).symbol_tradable(symbol).await
    }
}
