//! Strategy kind and its status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StrategyStatus;

/// The kind of multi-leg strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    /// One-Cancels-Other take-profit/stop-loss pair.
    Oco,
    /// Time-weighted average price schedule.
    Twap,
    /// Entry plus protective stop-loss and take-profit.
    Bracket,
}

impl StrategyKind {
    /// Whether this kind permits moving from `from` to `to`.
    ///
    /// - OCO: `CREATED -> LEGS_SUBMITTED -> ACTIVE -> {COMPLETED, PARTIALLY_CANCELLED, CANCELLED}`
    /// - TWAP: `CREATED -> ACTIVE -> {COMPLETED, CANCELLED}`
    /// - BRACKET: `CREATED -> LEGS_SUBMITTED -> COMPLETED`
    ///
    /// OCO and BRACKET may also end `CANCELLED` or `PARTIALLY_CANCELLED`
    /// straight from `LEGS_SUBMITTED` when a cancel arrives mid-placement.
    ///
    /// Every non-terminal status may move to `ERROR`.
    #[must_use]
    pub fn allows_transition(&self, from: StrategyStatus, to: StrategyStatus) -> bool {
        use StrategyStatus::{
            Active, Cancelled, Completed, Created, Error, LegsSubmitted, PartiallyCancelled,
        };

        if from.is_terminal() {
            return false;
        }
        if to == Error {
            return true;
        }

        match self {
            Self::Oco => matches!(
                (from, to),
                (Created, LegsSubmitted)
                    | (LegsSubmitted, Active | PartiallyCancelled | Cancelled)
                    | (Active, Completed | PartiallyCancelled | Cancelled)
            ),
            Self::Twap => matches!(
                (from, to),
                (Created, Active) | (Active, Completed | Cancelled)
            ),
            Self::Bracket => matches!(
                (from, to),
                (Created, LegsSubmitted) | (LegsSubmitted, Completed | PartiallyCancelled | Cancelled)
            ),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oco => write!(f, "OCO"),
            Self::Twap => write!(f, "TWAP"),
            Self::Bracket => write!(f, "BRACKET"),
        }
    }
}
