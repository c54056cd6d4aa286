//! Strategy DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::{OrderSide, OrderType};
use crate::domain::shared::{ExchangeOrderId, StrategyId, Symbol};
use crate::domain::strategy::StrategyStatus;

/// DTO for creating an OCO strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOcoDto {
    /// Symbol.
    pub symbol: String,
    /// Quantity for each leg.
    pub quantity: Decimal,
    /// Take-profit price.
    pub take_profit_price: Decimal,
    /// Stop-loss trigger price.
    pub stop_loss_price: Decimal,
    /// Side of both exit legs (SELL closes a long).
    pub side: OrderSide,
}

/// DTO for creating a TWAP strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTwapDto {
    /// Symbol.
    pub symbol: String,
    /// Total quantity to execute.
    pub total_quantity: Decimal,
    /// Side.
    pub side: OrderSide,
    /// Execution window in minutes.
    pub duration_minutes: Decimal,
    /// Chunk count; defaults to one per minute.
    #[serde(default)]
    pub num_chunks: Option<u32>,
    /// `MARKET` or `LIMIT`.
    pub order_type: OrderType,
}

/// DTO for creating a bracket strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBracketDto {
    /// Symbol.
    pub symbol: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Entry limit price.
    pub entry_price: Decimal,
    /// Stop-loss trigger price.
    pub stop_loss_price: Decimal,
    /// Take-profit price.
    pub take_profit_price: Decimal,
    /// Entry side.
    pub side: OrderSide,
}

macro_rules! impl_symbol {
    ($($dto:ty),+) => {
        $(
            impl $dto {
                /// Normalized symbol.
                #[must_use]
                pub fn symbol(&self) -> Symbol {
                    Symbol::new(&self.symbol)
                }
            }
        )+
    };
}

impl_symbol!(CreateOcoDto, CreateTwapDto, CreateBracketDto);

/// Acknowledgement of a cancel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelAckDto {
    /// Strategy ID.
    pub strategy_id: StrategyId,
    /// Status after the request was handled.
    pub status: StrategyStatus,
    /// The strategy was already terminal; nothing was done.
    pub already_terminal: bool,
    /// Orders cancelled on the exchange.
    pub cancelled_orders: Vec<ExchangeOrderId>,
    /// Orders whose cancel failed.
    pub failed_orders: Vec<ExchangeOrderId>,
}

impl CancelAckDto {
    /// Acknowledgement for a strategy that needed no exchange calls.
    #[must_use]
    pub const fn without_orders(
        strategy_id: StrategyId,
        status: StrategyStatus,
        already_terminal: bool,
    ) -> Self {
        Self {
            strategy_id,
            status,
            already_terminal,
            cancelled_orders: Vec::new(),
            failed_orders: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn twap_dto_defaults_chunk_count() {
        let json = r#"{
            "symbol": "btcusdt",
            "total_quantity": "1.0",
            "side": "BUY",
            "duration_minutes": "10",
            "order_type": "MARKET"
        }"#;
        let dto: CreateTwapDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.num_chunks, None);
        assert_eq!(dto.total_quantity, dec!(1.0));
        assert_eq!(dto.symbol().as_str(), "BTCUSDT");
    }

    #[test]
    fn cancel_ack_without_orders() {
        let ack = CancelAckDto::without_orders(
            StrategyId::new("BRACKET_1"),
            StrategyStatus::Completed,
            true,
        );
        assert!(ack.already_terminal);
        assert!(ack.cancelled_orders.is_empty());
        assert!(ack.failed_orders.is_empty());
    }
}
