//! Strategy Domain Errors

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::value_objects::{LegRole, StrategyStatus};
use crate::domain::order_execution::{OrderSide, OrderType};

/// Required position of a price relative to a reference price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRelation {
    /// Strictly above the reference.
    Above,
    /// Strictly below the reference.
    Below,
}

impl PriceRelation {
    /// Check whether `price` satisfies this relation against `reference`.
    #[must_use]
    pub fn holds(&self, price: Decimal, reference: Decimal) -> bool {
        match self {
            Self::Above => price > reference,
            Self::Below => price < reference,
        }
    }
}

impl fmt::Display for PriceRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::Below => write!(f, "below"),
        }
    }
}

/// Rejection raised before any leg reaches the exchange.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A quantity, price or duration was zero or negative.
    #[error("Invalid {name}: {value}. It must be a positive number")]
    NotPositive {
        /// Parameter name.
        name: String,
        /// Rejected value.
        value: Decimal,
    },

    /// Symbol failed local shape checks.
    #[error("Invalid symbol '{symbol}': {reason}")]
    InvalidSymbol {
        /// Rejected symbol.
        symbol: String,
        /// Reason.
        reason: String,
    },

    /// Symbol does not exist on the exchange.
    #[error("Unknown symbol: {symbol}")]
    UnknownSymbol {
        /// Rejected symbol.
        symbol: String,
    },

    /// Symbol exists but is not currently trading.
    #[error("Symbol {symbol} is not currently tradable")]
    SymbolNotTradable {
        /// Rejected symbol.
        symbol: String,
    },

    /// Symbol lookup could not be completed.
    #[error("Could not validate symbol {symbol}: {message}")]
    SymbolLookupFailed {
        /// Symbol being validated.
        symbol: String,
        /// Gateway error details.
        message: String,
    },

    /// Current price needed for price-ordering checks was unavailable.
    #[error("Current price unavailable for {symbol}: {message}")]
    PriceUnavailable {
        /// Symbol being priced.
        symbol: String,
        /// Gateway error details.
        message: String,
    },

    /// A protective price sits on the wrong side of its reference price.
    #[error("{leg} price {price} must be {must_be} {reference_name} {reference} for {side} side")]
    PriceOrdering {
        /// Leg whose price is misplaced.
        leg: LegRole,
        /// Strategy side.
        side: OrderSide,
        /// Offending price.
        price: Decimal,
        /// Required relation.
        must_be: PriceRelation,
        /// Reference label ("current price", "entry price").
        reference_name: String,
        /// Reference value.
        reference: Decimal,
    },

    /// TWAP chunk would be smaller than the exchange minimum.
    #[error("Chunk size {chunk_size} is below minimum {min_quantity}")]
    ChunkBelowMinimum {
        /// Computed chunk size.
        chunk_size: Decimal,
        /// Exchange minimum quantity.
        min_quantity: Decimal,
    },

    /// TWAP chunk count must be at least one and fit in a `u32`.
    #[error("Invalid chunk count: {num_chunks}")]
    InvalidChunkCount {
        /// Rejected count, requested or derived from the window.
        num_chunks: Decimal,
    },

    /// Order type not supported for this strategy kind.
    #[error("Order type {order_type} is not supported here")]
    UnsupportedOrderType {
        /// Rejected order type.
        order_type: OrderType,
    },
}

/// Aggregate invariant violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// Strategy already reached a terminal status.
    #[error("Strategy is already in terminal state {status}")]
    TerminalState {
        /// The frozen status.
        status: StrategyStatus,
    },

    /// Transition not permitted by the kind's state machine.
    #[error("Invalid strategy transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: StrategyStatus,
        /// Requested status.
        to: StrategyStatus,
    },

    /// Operation only valid for another strategy kind.
    #[error("Operation requires a {expected} strategy")]
    KindMismatch {
        /// Kind the operation expects.
        expected: String,
    },
}
