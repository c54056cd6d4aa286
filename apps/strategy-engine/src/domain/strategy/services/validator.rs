//! Pre-submission validation rules.
//!
//! Everything here is pure. Gateway lookups (symbol validity, current price,
//! minimum quantity) happen in the application layer, which feeds the
//! results into these checks.

use rust_decimal::Decimal;

use crate::domain::order_execution::OrderSide;
use crate::domain::strategy::errors::{PriceRelation, ValidationError};
use crate::domain::strategy::value_objects::LegRole;

/// Stateless validator for strategy parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyValidator;

impl StrategyValidator {
    /// Fail unless `value` is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotPositive`] naming the parameter.
    pub fn positive(value: Decimal, name: &str) -> Result<(), ValidationError> {
        if value > Decimal::ZERO {
            Ok(())
        } else {
            Err(ValidationError::NotPositive {
                name: name.to_string(),
                value,
            })
        }
    }

    /// OCO exit prices relative to the current market price.
    ///
    /// SELL (closing a long): take-profit above, stop-loss below.
    /// BUY (closing a short): take-profit below, stop-loss above.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PriceOrdering`] for the first misplaced leg.
    pub fn oco_price_ordering(
        side: OrderSide,
        take_profit_price: Decimal,
        stop_loss_price: Decimal,
        current_price: Decimal,
    ) -> Result<(), ValidationError> {
        let (tp_must_be, sl_must_be) = match side {
            OrderSide::Sell => (PriceRelation::Above, PriceRelation::Below),
            OrderSide::Buy => (PriceRelation::Below, PriceRelation::Above),
        };

        check_ordering(
            LegRole::TakeProfit,
            side,
            take_profit_price,
            tp_must_be,
            "current price",
            current_price,
        )?;
        check_ordering(
            LegRole::StopLoss,
            side,
            stop_loss_price,
            sl_must_be,
            "current price",
            current_price,
        )
    }

    /// Bracket exit prices relative to the entry price.
    ///
    /// BUY entry: `stop_loss < entry < take_profit`.
    /// SELL entry: `take_profit < entry < stop_loss`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PriceOrdering`] for the first misplaced leg.
    pub fn bracket_price_ordering(
        side: OrderSide,
        entry_price: Decimal,
        stop_loss_price: Decimal,
        take_profit_price: Decimal,
    ) -> Result<(), ValidationError> {
        let (sl_must_be, tp_must_be) = match side {
            OrderSide::Buy => (PriceRelation::Below, PriceRelation::Above),
            OrderSide::Sell => (PriceRelation::Above, PriceRelation::Below),
        };

        check_ordering(
            LegRole::StopLoss,
            side,
            stop_loss_price,
            sl_must_be,
            "entry price",
            entry_price,
        )?;
        check_ordering(
            LegRole::TakeProfit,
            side,
            take_profit_price,
            tp_must_be,
            "entry price",
            entry_price,
        )
    }

    /// TWAP chunk size against the exchange minimum, when one is known.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ChunkBelowMinimum`] if the chunk is too small.
    pub fn min_chunk_size(
        chunk_size: Decimal,
        min_quantity: Option<Decimal>,
    ) -> Result<(), ValidationError> {
        match min_quantity {
            Some(min_quantity) if chunk_size < min_quantity => {
                Err(ValidationError::ChunkBelowMinimum {
                    chunk_size,
                    min_quantity,
                })
            }
            _ => Ok(()),
        }
    }
}

fn check_ordering(
    leg: LegRole,
    side: OrderSide,
    price: Decimal,
    must_be: PriceRelation,
    reference_name: &str,
    reference: Decimal,
) -> Result<(), ValidationError> {
    if must_be.holds(price, reference) {
        return Ok(());
    }
    Err(ValidationError::PriceOrdering {
        leg,
        side,
        price,
        must_be,
        reference_name: reference_name.to_string(),
        reference,
    })
}
