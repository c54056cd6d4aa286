//! Strategy Aggregate Root
//!
//! Owns the legs submitted for a strategy, enforces the kind's status state
//! machine and keeps an append-only error log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::{OrderSide, OrderStatus};
use crate::domain::shared::{StrategyId, Symbol};
use crate::domain::strategy::errors::StrategyError;
use crate::domain::strategy::value_objects::{
    ErrorKind, ErrorRecord, Leg, LegRole, StrategyDetails, StrategyKind, StrategyStatus, TwapPlan,
};

/// Strategy Aggregate Root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    id: StrategyId,
    symbol: Symbol,
    side: OrderSide,
    quantity: Decimal,
    status: StrategyStatus,
    legs: Vec<Leg>,
    details: StrategyDetails,
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    errors: Vec<ErrorRecord>,
}

impl Strategy {
    fn new(symbol: Symbol, side: OrderSide, quantity: Decimal, details: StrategyDetails) -> Self {
        Self {
            id: StrategyId::generate(details.kind()),
            symbol,
            side,
            quantity,
            status: StrategyStatus::Created,
            legs: Vec::new(),
            details,
            created_at: Utc::now(),
            ended_at: None,
            errors: Vec::new(),
        }
    }

    /// Create an OCO strategy. `side` is the side of both exit legs.
    #[must_use]
    pub fn oco(
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        take_profit_price: Decimal,
        stop_loss_price: Decimal,
    ) -> Self {
        Self::new(
            symbol,
            side,
            quantity,
            StrategyDetails::Oco {
                take_profit_price,
                stop_loss_price,
            },
        )
    }

    /// Create a TWAP strategy from a plan.
    #[must_use]
    pub fn twap(symbol: Symbol, side: OrderSide, plan: TwapPlan) -> Self {
        let quantity = plan.total_quantity;
        Self::new(symbol, side, quantity, StrategyDetails::Twap(plan))
    }

    /// Create a bracket strategy. `side` is the entry side.
    #[must_use]
    pub fn bracket(
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        entry_price: Decimal,
        stop_loss_price: Decimal,
        take_profit_price: Decimal,
    ) -> Self {
        Self::new(
            symbol,
            side,
            quantity,
            StrategyDetails::Bracket {
                entry_price,
                stop_loss_price,
                take_profit_price,
            },
        )
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the strategy ID.
    #[must_use]
    pub const fn id(&self) -> &StrategyId {
        &self.id
    }

    /// Get the strategy kind.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        self.details.kind()
    }

    /// Get the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the strategy side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Get the total quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> StrategyStatus {
        self.status
    }

    /// Check if the status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Get the legs in submission order.
    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Find the leg playing `role`.
    #[must_use]
    pub fn leg(&self, role: LegRole) -> Option<&Leg> {
        self.legs.iter().find(|leg| leg.role == role)
    }

    /// Get the kind-specific parameters.
    #[must_use]
    pub const fn details(&self) -> &StrategyDetails {
        &self.details
    }

    /// Get the TWAP plan, if this is a TWAP strategy.
    #[must_use]
    pub const fn twap_plan(&self) -> Option<&TwapPlan> {
        match &self.details {
            StrategyDetails::Twap(plan) => Some(plan),
            _ => None,
        }
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the time the strategy reached a terminal status.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Get the error log.
    #[must_use]
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Move to a new status.
    ///
    /// Sets `ended_at` when the new status is terminal.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is already terminal or the kind does
    /// not permit the transition.
    pub fn transition(&mut self, to: StrategyStatus) -> Result<(), StrategyError> {
        self.ensure_not_terminal()?;
        if !self.kind().allows_transition(self.status, to) {
            return Err(StrategyError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        if to.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Append a leg.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is already terminal.
    pub fn push_leg(&mut self, leg: Leg) -> Result<(), StrategyError> {
        self.ensure_not_terminal()?;
        self.legs.push(leg);
        Ok(())
    }

    /// Append an acknowledged TWAP chunk and advance the plan counters.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is terminal or not a TWAP.
    pub fn record_chunk(&mut self, leg: Leg) -> Result<(), StrategyError> {
        self.ensure_not_terminal()?;
        let StrategyDetails::Twap(plan) = &mut self.details else {
            return Err(StrategyError::KindMismatch {
                expected: StrategyKind::Twap.to_string(),
            });
        };

        plan.record_fill(leg.executed_quantity);
        self.legs.push(leg);
        Ok(())
    }

    /// Refresh the last known exchange status of a leg.
    ///
    /// Allowed after termination: reconciliation may still observe fills.
    /// Returns `false` if no leg plays `role`.
    pub fn update_leg_status(&mut self, role: LegRole, status: OrderStatus) -> bool {
        match self.legs.iter_mut().find(|leg| leg.role == role) {
            Some(leg) => {
                leg.last_known_status = Some(status);
                true
            }
            None => false,
        }
    }

    /// Append an entry to the error log.
    pub fn record_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(ErrorRecord::now(kind, message));
    }

    const fn ensure_not_terminal(&self) -> Result<(), StrategyError> {
        if self.status.is_terminal() {
            return Err(StrategyError::TerminalState {
                status: self.status,
            });
        }
        Ok(())
    }
}
