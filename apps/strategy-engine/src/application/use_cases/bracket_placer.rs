//! Bracket Placer
//!
//! Submits an entry limit order followed by its protective stop-loss and
//! take-profit. Placement is fail-fast: the first rejected leg stops the
//! sequence and every leg already placed is cancelled best-effort.
//!
//! The protective legs go out immediately after the entry acknowledgement,
//! without waiting for the entry to fill. A cancel requested mid-placement
//! stops the sequence the same way and ends the strategy `CANCELLED` or
//! `PARTIALLY_CANCELLED`.

use std::sync::Arc;

use super::leg_submission::{cancel_live_legs, submit_leg};
use crate::application::ports::ExchangeGateway;
use crate::application::services::{RegistryError, StrategyRegistry};
use crate::config::StrategyConfig;
use crate::domain::order_execution::OrderType;
use crate::domain::shared::StrategyId;
use crate::domain::strategy::{
    ErrorKind, Leg, LegRole, Strategy, StrategyDetails, StrategyError, StrategyStatus,
};

/// Places bracket strategies.
pub struct BracketPlacer<G>
where
    G: ExchangeGateway,
{
    gateway: Arc<G>,
    registry: Arc<StrategyRegistry>,
    config: StrategyConfig,
}

impl<G> BracketPlacer<G>
where
    G: ExchangeGateway,
{
    /// Create a new `BracketPlacer`.
    pub const fn new(
        gateway: Arc<G>,
        registry: Arc<StrategyRegistry>,
        config: StrategyConfig,
    ) -> Self {
        Self {
            gateway,
            registry,
            config,
        }
    }

    /// Place entry, stop-loss and take-profit in that order.
    ///
    /// Ends `COMPLETED` once all three are acknowledged, or `ERROR` after a
    /// rejected leg and rollback of the placed ones. The cancel flag is
    /// checked before every leg and, under the strategy lock, before
    /// completing.
    pub async fn place(&self, id: &StrategyId) -> Result<Strategy, RegistryError> {
        let strategy = self.registry.snapshot(id)?;
        let StrategyDetails::Bracket {
            entry_price,
            stop_loss_price,
            take_profit_price,
        } = *strategy.details()
        else {
            return Err(StrategyError::KindMismatch {
                expected: "BRACKET".to_string(),
            }
            .into());
        };
        let symbol = strategy.symbol().clone();
        let side = strategy.side();
        let exit_side = side.opposite();
        let quantity = strategy.quantity();
        let tif = self.config.time_in_force;

        self.registry
            .update(id, |s| s.transition(StrategyStatus::LegsSubmitted))??;

        let legs = [
            Leg::new(LegRole::Entry, side, OrderType::Limit, quantity).with_price(entry_price),
            Leg::new(LegRole::StopLoss, exit_side, OrderType::Stop, quantity)
                .with_price(
                    exit_side.marketable_price(stop_loss_price, self.config.stop_limit_buffer_bps),
                )
                .with_stop_price(stop_loss_price),
            Leg::new(LegRole::TakeProfit, exit_side, OrderType::TakeProfit, quantity)
                .with_price(take_profit_price)
                .with_stop_price(take_profit_price),
        ];

        for leg in legs {
            if self.registry.is_cancel_requested(id)? {
                return self.abandon_placement(id).await;
            }
            match submit_leg(self.gateway.as_ref(), id, &symbol, leg, tif).await {
                Ok((leg, _)) => {
                    self.registry.update(id, |s| s.push_leg(leg))??;
                }
                Err((leg, e)) => {
                    let role = leg.role;
                    self.registry.update(id, |s| {
                        s.push_leg(leg)?;
                        s.record_error(
                            ErrorKind::Gateway,
                            format!("{role} submission failed: {e}"),
                        );
                        Ok::<(), StrategyError>(())
                    })??;
                    cancel_live_legs(self.gateway.as_ref(), &self.registry, id, ErrorKind::Diagnostic)
                        .await?;
                    self.registry
                        .update(id, |s| s.transition(StrategyStatus::Error))??;
                    tracing::error!(strategy_id = %id, leg = %role, "Bracket placement failed");
                    return self.registry.snapshot(id);
                }
            }
        }

        let completed = self.registry.update_observing_cancel(
            id,
            |s: &mut Strategy, cancel_requested: bool| -> Result<bool, StrategyError> {
                if cancel_requested {
                    return Ok(false);
                }
                s.transition(StrategyStatus::Completed).map(|()| true)
            },
        )??;
        if !completed {
            return self.abandon_placement(id).await;
        }
        tracing::info!(strategy_id = %id, symbol = %symbol, "Bracket placed");
        self.registry.snapshot(id)
    }

    async fn abandon_placement(&self, id: &StrategyId) -> Result<Strategy, RegistryError> {
        let cancellation =
            cancel_live_legs(self.gateway.as_ref(), &self.registry, id, ErrorKind::Gateway).await?;
        let status = cancellation.terminal_status();
        self.registry.update(id, |s| s.transition(status))??;
        tracing::info!(strategy_id = %id, status = %status, "Bracket cancelled during placement");
        self.registry.snapshot(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{GatewayError, OrderAck, SubmitOrderRequest};
    use crate::domain::order_execution::{OrderSide, OrderStatus};
    use crate::domain::shared::{ExchangeOrderId, Symbol};
    use crate::infrastructure::exchange::PaperExchange;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Paper exchange that requests cancellation of every registered
    /// strategy once it has accepted `after` orders.
    struct CancelAfter {
        inner: Arc<PaperExchange>,
        registry: Arc<StrategyRegistry>,
        after: usize,
    }

    #[async_trait]
    impl ExchangeGateway for CancelAfter {
        async fn submit_order(&self, request: SubmitOrderRequest) -> Result<OrderAck, GatewayError> {
            let ack = self.inner.submit_order(request).await;
            if self.inner.submissions().len() == self.after {
                for strategy in self.registry.list() {
                    self.registry.request_cancel(strategy.id()).unwrap();
                }
            }
            ack
        }

        async fn get_order(
            &self,
            symbol: &Symbol,
            order_id: &ExchangeOrderId,
        ) -> Result<OrderAck, GatewayError> {
            self.inner.get_order(symbol, order_id).await
        }

        async fn cancel_order(
            &self,
            symbol: &Symbol,
            order_id: &ExchangeOrderId,
        ) -> Result<(), GatewayError> {
            self.inner.cancel_order(symbol, order_id).await
        }

        async fn current_price(&self, symbol: &Symbol) -> Result<Decimal, GatewayError> {
            self.inner.current_price(symbol).await
        }

        async fn min_quantity(&self, symbol: &Symbol) -> Result<Option<Decimal>, GatewayError> {
            self.inner.min_quantity(symbol).await
        }

        async fn symbol_tradable(&self, symbol: &Symbol) -> Result<bool, GatewayError> {
            self.inner.symbol_tradable(symbol).await
        }
    }

    fn cancelling_setup(
        after: usize,
    ) -> (Arc<PaperExchange>, Arc<StrategyRegistry>, BracketPlacer<CancelAfter>) {
        let exchange = Arc::new(PaperExchange::new().with_symbol("ETHUSDT", dec!(2000)));
        let registry = Arc::new(StrategyRegistry::new());
        let gateway = CancelAfter {
            inner: Arc::clone(&exchange),
            registry: Arc::clone(&registry),
            after,
        };
        let placer = BracketPlacer::new(
            Arc::new(gateway),
            Arc::clone(&registry),
            StrategyConfig::default(),
        );
        (exchange, registry, placer)
    }

    fn setup() -> (Arc<PaperExchange>, Arc<StrategyRegistry>, BracketPlacer<PaperExchange>) {
        let exchange = Arc::new(PaperExchange::new().with_symbol("ETHUSDT", dec!(2000)));
        let registry = Arc::new(StrategyRegistry::new());
        let placer = BracketPlacer::new(
            Arc::clone(&exchange),
            Arc::clone(&registry),
            StrategyConfig::default(),
        );
        (exchange, registry, placer)
    }

    fn register(registry: &StrategyRegistry) -> StrategyId {
        let strategy = Strategy::bracket(
            Symbol::new("ETHUSDT"),
            OrderSide::Buy,
            dec!(0.1),
            dec!(1950),
            dec!(1900),
            dec!(2100),
        );
        registry.insert(strategy).unwrap().id().clone()
    }

    #[tokio::test]
    async fn places_three_legs_in_order() {
        let (exchange, registry, placer) = setup();
        let id = register(&registry);

        let strategy = placer.place(&id).await.unwrap();

        assert_eq!(strategy.status(), StrategyStatus::Completed);
        let roles: Vec<LegRole> = strategy.legs().iter().map(|l| l.role).collect();
        assert_eq!(roles, vec![LegRole::Entry, LegRole::StopLoss, LegRole::TakeProfit]);

        let submissions = exchange.submissions();
        assert_eq!(submissions[0].side, OrderSide::Buy);
        assert_eq!(submissions[0].order_type, OrderType::Limit);
        assert_eq!(submissions[0].price, Some(dec!(1950)));
        assert_eq!(submissions[1].side, OrderSide::Sell);
        assert_eq!(submissions[1].stop_price, Some(dec!(1900)));
        assert_eq!(submissions[1].price, Some(dec!(1890.5)));
        assert_eq!(submissions[2].side, OrderSide::Sell);
        assert_eq!(submissions[2].price, Some(dec!(2100)));
    }

    #[tokio::test]
    async fn take_profit_rejection_rolls_back_placed_legs() {
        let (exchange, registry, placer) = setup();
        let id = register(&registry);
        exchange.fail_submission(
            3,
            GatewayError::OrderRejected {
                reason: "price filter".to_string(),
            },
        );

        let strategy = placer.place(&id).await.unwrap();

        assert_eq!(strategy.status(), StrategyStatus::Error);
        assert_eq!(strategy.legs().len(), 3);
        assert_eq!(exchange.cancellations().len(), 2);
        for role in [LegRole::Entry, LegRole::StopLoss] {
            assert_eq!(
                strategy.leg(role).and_then(|l| l.last_known_status),
                Some(OrderStatus::Canceled)
            );
        }
        assert!(!strategy.legs()[2].is_placed());
        assert_eq!(strategy.errors().len(), 1);
    }

    #[tokio::test]
    async fn entry_rejection_places_nothing() {
        let (exchange, registry, placer) = setup();
        let id = register(&registry);
        exchange.fail_next_submission(GatewayError::RateLimited);

        let strategy = placer.place(&id).await.unwrap();

        assert_eq!(strategy.status(), StrategyStatus::Error);
        assert_eq!(exchange.submissions().len(), 1);
        assert!(exchange.cancellations().is_empty());
    }

    #[tokio::test]
    async fn failed_rollback_is_recorded() {
        let (exchange, registry, placer) = setup();
        let id = register(&registry);
        exchange.fail_submission(2, GatewayError::RateLimited);
        exchange.fail_cancel(&"1".into());

        let strategy = placer.place(&id).await.unwrap();

        assert_eq!(strategy.status(), StrategyStatus::Error);
        assert_eq!(strategy.errors().len(), 2);
        assert_eq!(strategy.errors()[1].kind, ErrorKind::Diagnostic);
        assert_eq!(exchange.order_status(&"1".into()), Some(OrderStatus::New));
    }

    #[tokio::test]
    async fn cancel_between_legs_rolls_back_entry() {
        let (exchange, registry, placer) = cancelling_setup(1);
        let id = register(&registry);

        let strategy = placer.place(&id).await.unwrap();

        assert_eq!(strategy.status(), StrategyStatus::Cancelled);
        assert_eq!(exchange.submissions().len(), 1);
        assert_eq!(exchange.cancellations(), vec![ExchangeOrderId::new("1")]);
        assert_eq!(
            strategy.leg(LegRole::Entry).and_then(|l| l.last_known_status),
            Some(OrderStatus::Canceled)
        );
        assert!(strategy.leg(LegRole::StopLoss).is_none());
    }

    #[tokio::test]
    async fn cancel_after_last_leg_prevents_completion() {
        let (exchange, registry, placer) = cancelling_setup(3);
        let id = register(&registry);

        let strategy = placer.place(&id).await.unwrap();

        assert_eq!(strategy.status(), StrategyStatus::Cancelled);
        assert_eq!(strategy.legs().len(), 3);
        assert_eq!(exchange.cancellations().len(), 3);
    }

    #[tokio::test]
    async fn cancel_between_legs_with_failed_rollback_is_partial() {
        let (exchange, registry, placer) = cancelling_setup(2);
        let id = register(&registry);
        exchange.fail_cancel(&ExchangeOrderId::new("1"));

        let strategy = placer.place(&id).await.unwrap();

        assert_eq!(strategy.status(), StrategyStatus::PartiallyCancelled);
        assert_eq!(exchange.cancellations(), vec![ExchangeOrderId::new("2")]);
        assert_eq!(strategy.errors()[0].kind, ErrorKind::Gateway);
    }
}
