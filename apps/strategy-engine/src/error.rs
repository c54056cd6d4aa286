//! Error handling for the strategy engine façade.
//!
//! [`OrchestratorError`] is what callers of
//! [`StrategyOrchestrator`](crate::application::services::StrategyOrchestrator)
//! see. Each variant maps to a stable [`ErrorCode`] so outer layers (CLI, HTTP,
//! RPC) can branch on a reason string instead of parsing messages.
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `INVALID_REQUEST` | Non-positive quantity/price, bad chunk count or order type |
//! | `INVALID_SYMBOL` | Symbol malformed, unknown or not trading |
//! | `INVALID_PRICE_ORDERING` | Protective price on the wrong side of its reference |
//! | `BELOW_MINIMUM_QUANTITY` | TWAP chunk below the exchange minimum |
//! | `MARKET_DATA_UNAVAILABLE` | Current price could not be fetched |
//! | `STRATEGY_NOT_FOUND` | Unknown strategy ID |
//! | `WRONG_STRATEGY_KIND` | Operation not defined for this strategy kind |
//! | `STRATEGY_NOT_TERMINAL` | Eviction of a running strategy |
//! | `INTERNAL_ERROR` | Aggregate invariant or task failure |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::services::RegistryError;
use crate::domain::shared::StrategyId;
use crate::domain::strategy::{StrategyError, StrategyKind, ValidationError};

/// Stable error codes for the strategy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    /// Invalid request parameters.
    InvalidRequest,
    /// Invalid, unknown or non-trading symbol.
    InvalidSymbol,
    /// Protective price on the wrong side of its reference.
    InvalidPriceOrdering,
    /// Quantity below exchange minimum.
    BelowMinimumQuantity,
    /// Market data required for validation was unavailable.
    MarketDataUnavailable,

    // Lookup errors
    /// Strategy not found.
    StrategyNotFound,
    /// Operation not defined for this strategy kind.
    WrongStrategyKind,
    /// Strategy still running.
    StrategyNotTerminal,

    // Internal errors
    /// Internal error.
    InternalError,
}

impl ErrorCode {
    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidSymbol => "INVALID_SYMBOL",
            Self::InvalidPriceOrdering => "INVALID_PRICE_ORDERING",
            Self::BelowMinimumQuantity => "BELOW_MINIMUM_QUANTITY",
            Self::MarketDataUnavailable => "MARKET_DATA_UNAVAILABLE",
            Self::StrategyNotFound => "STRATEGY_NOT_FOUND",
            Self::WrongStrategyKind => "WRONG_STRATEGY_KIND",
            Self::StrategyNotTerminal => "STRATEGY_NOT_TERMINAL",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the error was raised before any exchange side effect.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest
                | Self::InvalidSymbol
                | Self::InvalidPriceOrdering
                | Self::BelowMinimumQuantity
                | Self::MarketDataUnavailable
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Errors returned by the strategy orchestrator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Rejected before anything was registered or submitted.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown strategy ID.
    #[error("Strategy not found: {id}")]
    NotFound {
        /// Requested ID.
        id: StrategyId,
    },

    /// Operation requires another strategy kind.
    #[error("Strategy {id} is {actual}, expected {expected}")]
    WrongKind {
        /// Strategy ID.
        id: StrategyId,
        /// Kind the operation requires.
        expected: StrategyKind,
        /// Actual kind.
        actual: StrategyKind,
    },

    /// Registry rejected the operation.
    #[error(transparent)]
    Registry(RegistryError),

    /// Background task panicked or was aborted.
    #[error("Strategy task {id} failed: {message}")]
    Task {
        /// Strategy ID.
        id: StrategyId,
        /// Join error details.
        message: String,
    },
}

impl From<RegistryError> for OrchestratorError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { id } => Self::NotFound { id },
            other => Self::Registry(other),
        }
    }
}

impl From<StrategyError> for OrchestratorError {
    fn from(err: StrategyError) -> Self {
        Self::Registry(RegistryError::Strategy(err))
    }
}

impl OrchestratorError {
    /// Stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(err) => match err {
                ValidationError::NotPositive { .. }
                | ValidationError::InvalidChunkCount { .. }
                | ValidationError::UnsupportedOrderType { .. } => ErrorCode::InvalidRequest,
                ValidationError::InvalidSymbol { .. }
                | ValidationError::UnknownSymbol { .. }
                | ValidationError::SymbolNotTradable { .. }
                | ValidationError::SymbolLookupFailed { .. } => ErrorCode::InvalidSymbol,
                ValidationError::PriceOrdering { .. } => ErrorCode::InvalidPriceOrdering,
                ValidationError::ChunkBelowMinimum { .. } => ErrorCode::BelowMinimumQuantity,
                ValidationError::PriceUnavailable { .. } => ErrorCode::MarketDataUnavailable,
            },
            Self::NotFound { .. } => ErrorCode::StrategyNotFound,
            Self::WrongKind { .. } => ErrorCode::WrongStrategyKind,
            Self::Registry(RegistryError::NotTerminal { .. }) => ErrorCode::StrategyNotTerminal,
            Self::Registry(RegistryError::NotFound { .. }) => ErrorCode::StrategyNotFound,
            Self::Registry(_) | Self::Task { .. } => ErrorCode::InternalError,
        }
    }

    /// Serializable representation for outer layers.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Serializable error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}
