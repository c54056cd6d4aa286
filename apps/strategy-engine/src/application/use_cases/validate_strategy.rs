//! Validate Strategy Use Case
//!
//! Runs the pure [`StrategyValidator`] rules, fetching the exchange facts
//! they need (symbol status, current price, minimum quantity) first. Nothing
//! is submitted here.

use std::sync::Arc;

use crate::application::dto::{CreateBracketDto, CreateOcoDto, CreateTwapDto};
use crate::application::ports::{ExchangeGateway, GatewayError};
use crate::domain::shared::Symbol;
use crate::domain::strategy::{StrategyValidator, TwapPlan, ValidationError};

/// Use case for validating strategy requests before registration.
pub struct ValidateStrategyUseCase<G>
where
    G: ExchangeGateway,
{
    gateway: Arc<G>,
}

impl<G> ValidateStrategyUseCase<G>
where
    G: ExchangeGateway,
{
    /// Create a new `ValidateStrategyUseCase`.
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Fail unless the symbol is well-formed, listed and trading.
    pub async fn tradable_symbol(&self, symbol: &Symbol) -> Result<(), ValidationError> {
        symbol.validate()?;

        match self.gateway.symbol_tradable(symbol).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ValidationError::SymbolNotTradable {
                symbol: symbol.to_string(),
            }),
            Err(GatewayError::UnknownSymbol { .. }) => Err(ValidationError::UnknownSymbol {
                symbol: symbol.to_string(),
            }),
            Err(e) => Err(ValidationError::SymbolLookupFailed {
                symbol: symbol.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Validate an OCO request against the current market price.
    pub async fn validate_oco(&self, dto: &CreateOcoDto) -> Result<(), ValidationError> {
        StrategyValidator::positive(dto.quantity, "quantity")?;
        StrategyValidator::positive(dto.take_profit_price, "take_profit_price")?;
        StrategyValidator::positive(dto.stop_loss_price, "stop_loss_price")?;

        let symbol = dto.symbol();
        self.tradable_symbol(&symbol).await?;

        let current_price = self.gateway.current_price(&symbol).await.map_err(|e| {
            ValidationError::PriceUnavailable {
                symbol: symbol.to_string(),
                message: e.to_string(),
            }
        })?;

        StrategyValidator::oco_price_ordering(
            dto.side,
            dto.take_profit_price,
            dto.stop_loss_price,
            current_price,
        )
    }

    /// Validate a TWAP request and build its plan.
    ///
    /// A failed minimum-quantity lookup is logged and the check skipped.
    pub async fn validate_twap(&self, dto: &CreateTwapDto) -> Result<TwapPlan, ValidationError> {
        StrategyValidator::positive(dto.total_quantity, "total_quantity")?;
        StrategyValidator::positive(dto.duration_minutes, "duration_minutes")?;

        let symbol = dto.symbol();
        self.tradable_symbol(&symbol).await?;

        let plan = TwapPlan::new(
            dto.total_quantity,
            dto.duration_minutes,
            dto.num_chunks,
            dto.order_type,
        )?;

        match self.gateway.min_quantity(&symbol).await {
            Ok(min_quantity) => StrategyValidator::min_chunk_size(plan.chunk_size, min_quantity)?,
            Err(e) => tracing::warn!(
                symbol = %symbol,
                error = %e,
                "Minimum quantity lookup failed, skipping chunk size check"
            ),
        }

        Ok(plan)
    }

    /// Validate a bracket request.
    pub async fn validate_bracket(&self, dto: &CreateBracketDto) -> Result<(), ValidationError> {
        StrategyValidator::positive(dto.quantity, "quantity")?;
        StrategyValidator::positive(dto.entry_price, "entry_price")?;
        StrategyValidator::positive(dto.stop_loss_price, "stop_loss_price")?;
        StrategyValidator::positive(dto.take_profit_price, "take_profit_price")?;

        self.tradable_symbol(&dto.symbol()).await?;

        StrategyValidator::bracket_price_ordering(
            dto.side,
            dto.entry_price,
            dto.stop_loss_price,
            dto.take_profit_price,
        )
    }
}
