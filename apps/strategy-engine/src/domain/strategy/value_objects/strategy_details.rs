//! Kind-specific strategy parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{StrategyKind, TwapPlan};

/// Parameters that differ per strategy kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyDetails {
    /// OCO exit prices.
    Oco {
        /// Take-profit price.
        take_profit_price: Decimal,
        /// Stop-loss trigger price.
        stop_loss_price: Decimal,
    },
    /// TWAP schedule and progress.
    Twap(TwapPlan),
    /// Bracket prices.
    Bracket {
        /// Entry limit price.
        entry_price: Decimal,
        /// Stop-loss trigger price.
        stop_loss_price: Decimal,
        /// Take-profit price.
        take_profit_price: Decimal,
    },
}

impl StrategyDetails {
    /// The strategy kind these details belong to.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::Oco { .. } => StrategyKind::Oco,
            Self::Twap(_) => StrategyKind::Twap,
            Self::Bracket { .. } => StrategyKind::Bracket,
        }
    }
}
