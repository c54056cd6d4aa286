//! Strategy lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyStatus {
    /// Validated and registered, nothing submitted yet.
    Created,
    /// Legs are being or have been submitted.
    LegsSubmitted,
    /// Working on the exchange.
    Active,
    /// Finished normally.
    Completed,
    /// Cancel requested but at least one leg could not be cancelled.
    PartiallyCancelled,
    /// Cancelled by request.
    Cancelled,
    /// Finished abnormally.
    Error,
}

impl StrategyStatus {
    /// Terminal statuses never change again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::PartiallyCancelled | Self::Cancelled | Self::Error
        )
    }
}

impl fmt::Display for StrategyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::LegsSubmitted => write!(f, "LEGS_SUBMITTED"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::PartiallyCancelled => write!(f, "PARTIALLY_CANCELLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}
