//! TWAP Scheduler
//!
//! Splits a parent quantity into equal chunks submitted at a fixed interval.
//! One scheduler run executes one strategy; the orchestrator spawns it on
//! the runtime and keeps the join handle.
//!
//! Chunk failures are recorded and skipped. Cancellation is cooperative and
//! checked before every chunk; the inter-chunk wait wakes immediately when
//! the cancel token fires.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;

use super::leg_submission::submit_leg;
use crate::application::ports::ExchangeGateway;
use crate::application::services::{RegistryError, StrategyRegistry};
use crate::config::StrategyConfig;
use crate::domain::order_execution::OrderType;
use crate::domain::shared::StrategyId;
use crate::domain::strategy::{
    ErrorKind, Leg, LegRole, StrategyError, StrategyStatus, TwapPlan,
};

/// Errors that abort a TWAP run.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Registry lookup or update failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Strategy rejected a state change.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// Strategy is not a TWAP.
    #[error("Strategy {id} is not a TWAP")]
    NotTwap {
        /// Strategy ID.
        id: StrategyId,
    },
}

/// Executes TWAP strategies.
pub struct TwapScheduler<G>
where
    G: ExchangeGateway,
{
    gateway: Arc<G>,
    registry: Arc<StrategyRegistry>,
    config: StrategyConfig,
}

impl<G> TwapScheduler<G>
where
    G: ExchangeGateway,
{
    /// Create a new `TwapScheduler`.
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

    /// Run the strategy to completion or cancellation.
    ///
    /// Returns the final status. An unexpected error is recorded as
    /// `CRITICAL` and moves the strategy to `ERROR` before being returned.
    #[tracing::instrument(skip(self, id), fields(strategy_id = %id))]
    pub async fn run(&self, id: StrategyId) -> Result<StrategyStatus, SchedulerError> {
        match self.execute(&id).await {
            Ok(status) => Ok(status),
            Err(e) => {
                tracing::error!(error = %e, "TWAP run aborted");
                let recorded = self.registry.update(&id, |s| {
                    s.record_error(ErrorKind::Critical, format!("TWAP run aborted: {e}"));
                    if let Err(transition_error) = s.transition(StrategyStatus::Error) {
                        tracing::warn!(error = %transition_error, "TWAP error transition skipped");
                    }
                });
                if let Err(registry_error) = recorded {
                    tracing::warn!(error = %registry_error, "Could not record TWAP failure");
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, id: &StrategyId) -> Result<StrategyStatus, SchedulerError> {
        let strategy = self.registry.snapshot(id)?;
        let plan = strategy
            .twap_plan()
            .cloned()
            .ok_or_else(|| SchedulerError::NotTwap { id: id.clone() })?;
        let token = self.registry.cancel_token(id)?;
        let symbol = strategy.symbol().clone();
        let side = strategy.side();

        if strategy.status() == StrategyStatus::Created {
            self.registry
                .update(id, |s| s.transition(StrategyStatus::Active))??;
        }

        tracing::info!(
            symbol = %symbol,
            side = %side,
            total_quantity = %plan.total_quantity,
            num_chunks = plan.num_chunks,
            interval_seconds = %plan.interval_seconds,
            expected_end = %plan.expected_end(Utc::now()),
            "TWAP started"
        );

        for index in 0..plan.num_chunks {
            if token.is_cancelled() {
                return self.finish(id, StrategyStatus::Cancelled);
            }

            self.execute_chunk(id, &plan, index).await?;

            if !plan.is_last_chunk(index) {
                tokio::select! {
                    () = token.cancelled() => {
                        return self.finish(id, StrategyStatus::Cancelled);
                    }
                    () = tokio::time::sleep(plan.interval()) => {}
                }
            }
        }

        self.finish(id, StrategyStatus::Completed)
    }

    async fn execute_chunk(
        &self,
        id: &StrategyId,
        plan: &TwapPlan,
        index: u32,
    ) -> Result<(), SchedulerError> {
        let role = LegRole::Chunk(index + 1);
        let (symbol, side, quantity) = self.registry.update(id, |s| {
            let quantity = s
                .twap_plan()
                .map_or(Decimal::ZERO, |current| current.chunk_quantity(index));
            (s.symbol().clone(), s.side(), quantity)
        })?;

        if quantity <= Decimal::ZERO {
            tracing::warn!(chunk = %role, quantity = %quantity, "Nothing left to execute");
            self.registry.update(id, |s| {
                s.record_error(
                    ErrorKind::PartialExecution,
                    format!("{role} skipped: remaining quantity {quantity}"),
                );
            })?;
            return Ok(());
        }

        let mut leg = Leg::new(role, side, plan.order_type, quantity);
        if plan.order_type == OrderType::Limit {
            match self.gateway.current_price(&symbol).await {
                Ok(price) => {
                    leg = leg.with_price(
                        side.marketable_price(price, self.config.twap_limit_offset_bps),
                    );
                }
                Err(e) => {
                    tracing::warn!(chunk = %role, error = %e, "No price for limit chunk");
                    self.registry.update(id, |s| {
                        s.record_error(ErrorKind::Gateway, format!("{role} failed: {e}"));
                    })?;
                    return Ok(());
                }
            }
        }

        match submit_leg(
            self.gateway.as_ref(),
            id,
            &symbol,
            leg,
            self.config.time_in_force,
        )
        .await
        {
            Ok((mut leg, ack)) => {
                leg.executed_quantity = ack.executed_qty.unwrap_or(quantity);
                self.registry.update(id, |s| s.record_chunk(leg))??;
                tracing::debug!(chunk = %role, "Chunk recorded");
            }
            Err((_, e)) => {
                self.registry.update(id, |s| {
                    s.record_error(ErrorKind::Gateway, format!("{role} failed: {e}"));
                })?;
            }
        }
        Ok(())
    }

    fn finish(&self, id: &StrategyId, to: StrategyStatus) -> Result<StrategyStatus, SchedulerError> {
        let (status, executed, chunks) = self.registry.update(id, |s| {
            s.transition(to).map(|()| {
                let (executed, chunks) = s
                    .twap_plan()
                    .map_or((Decimal::ZERO, 0), |p| (p.total_executed, p.chunks_executed));
                (s.status(), executed, chunks)
            })
        })??;
        tracing::info!(
            status = %status,
            total_executed = %executed,
            chunks_executed = chunks,
            "TWAP finished"
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GatewayError;
    use crate::domain::order_execution::OrderSide;
    use crate::domain::shared::Symbol;
    use crate::domain::strategy::Strategy;
    use crate::infrastructure::exchange::PaperExchange;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    struct Fixture {
        exchange: Arc<PaperExchange>,
        registry: Arc<StrategyRegistry>,
        scheduler: Arc<TwapScheduler<PaperExchange>>,
    }

    fn fixture() -> Fixture {
        let exchange = Arc::new(PaperExchange::new().with_symbol("BTCUSDT", dec!(30000)));
        let registry = Arc::new(StrategyRegistry::new());
        let scheduler = Arc::new(TwapScheduler::new(
            Arc::clone(&exchange),
            Arc::clone(&registry),
            StrategyConfig::default(),
        ));
        Fixture {
            exchange,
            registry,
            scheduler,
        }
    }

    fn register(registry: &StrategyRegistry, plan: TwapPlan) -> StrategyId {
        let strategy = Strategy::twap(Symbol::new("BTCUSDT"), OrderSide::Buy, plan);
        registry.insert(strategy).unwrap().id().clone()
    }

    fn plan(total: Decimal, minutes: Decimal, chunks: u32, order_type: OrderType) -> TwapPlan {
        TwapPlan::new(total, minutes, Some(chunks), order_type).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn executes_all_chunks() {
        let f = fixture();
        let id = register(&f.registry, plan(dec!(1), dec!(10), 10, OrderType::Market));

        let started = tokio::time::Instant::now();
        let status = f.scheduler.run(id.clone()).await.unwrap();

        assert_eq!(status, StrategyStatus::Completed);
        assert!(started.elapsed() >= Duration::from_secs(9 * 60));
        assert!(started.elapsed() < Duration::from_secs(10 * 60));
        let strategy = f.registry.snapshot(&id).unwrap();
        let plan = strategy.twap_plan().unwrap();
        assert_eq!(plan.chunks_executed, 10);
        assert_eq!(plan.total_executed, dec!(1));
        assert_eq!(strategy.legs().len(), 10);
        assert_eq!(strategy.legs()[9].role, LegRole::Chunk(10));
        assert!(strategy.ended_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn last_chunk_absorbs_rounding() {
        let f = fixture();
        let id = register(&f.registry, plan(dec!(1), dec!(3), 3, OrderType::Market));

        f.scheduler.run(id.clone()).await.unwrap();

        let quantities: Vec<Decimal> =
            f.exchange.submissions().iter().map(|r| r.quantity).collect();
        assert_eq!(quantities[0], quantities[1]);
        assert_eq!(quantities.iter().copied().sum::<Decimal>(), dec!(1));
        let plan = f.registry.snapshot(&id).unwrap().twap_plan().cloned().unwrap();
        assert_eq!(plan.total_executed, dec!(1));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_chunk_is_skipped() {
        let f = fixture();
        let id = register(&f.registry, plan(dec!(1), dec!(4), 4, OrderType::Market));
        f.exchange.fail_submission(2, GatewayError::RateLimited);

        let status = f.scheduler.run(id.clone()).await.unwrap();

        assert_eq!(status, StrategyStatus::Completed);
        let strategy = f.registry.snapshot(&id).unwrap();
        let plan = strategy.twap_plan().unwrap();
        assert_eq!(plan.chunks_executed, 3);
        assert_eq!(plan.total_executed, dec!(1));
        assert_eq!(f.exchange.submissions()[3].quantity, dec!(0.5));
        assert_eq!(strategy.errors().len(), 1);
        assert!(strategy.errors()[0].message.starts_with("chunk_2 failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn limit_chunks_are_priced_from_current_price() {
        let f = fixture();
        let id = register(&f.registry, plan(dec!(0.2), dec!(2), 2, OrderType::Limit));

        f.scheduler.run(id).await.unwrap();

        let submissions = f.exchange.submissions();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].order_type, OrderType::Limit);
        assert_eq!(submissions[0].price, Some(dec!(30030)));
    }

    #[tokio::test(start_paused = true)]
    async fn limit_chunk_without_price_is_skipped() {
        let exchange = Arc::new(PaperExchange::new());
        exchange.add_symbol("BTCUSDT", true);
        let registry = Arc::new(StrategyRegistry::new());
        let scheduler = TwapScheduler::new(
            Arc::clone(&exchange),
            Arc::clone(&registry),
            StrategyConfig::default(),
        );
        let id = register(&registry, plan(dec!(0.2), dec!(2), 2, OrderType::Limit));

        let status = scheduler.run(id.clone()).await.unwrap();

        assert_eq!(status, StrategyStatus::Completed);
        assert!(exchange.submissions().is_empty());
        assert_eq!(registry.snapshot(&id).unwrap().errors().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_sleep() {
        let f = fixture();
        let id = register(&f.registry, plan(dec!(1), dec!(60), 2, OrderType::Market));

        let scheduler = Arc::clone(&f.scheduler);
        let run_id = id.clone();
        let handle = tokio::spawn(async move { scheduler.run(run_id).await });

        tokio::time::sleep(Duration::from_secs(5)).await;
        f.registry.request_cancel(&id).unwrap();
        let started = tokio::time::Instant::now();
        let status = handle.await.unwrap().unwrap();

        assert_eq!(status, StrategyStatus::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(f.exchange.submissions().len(), 1);
        let strategy = f.registry.snapshot(&id).unwrap();
        assert_eq!(strategy.twap_plan().unwrap().chunks_executed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_start_submits_nothing() {
        let f = fixture();
        let id = register(&f.registry, plan(dec!(1), dec!(5), 5, OrderType::Market));
        f.registry.request_cancel(&id).unwrap();

        let status = f.scheduler.run(id).await.unwrap();

        assert_eq!(status, StrategyStatus::Cancelled);
        assert!(f.exchange.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn non_twap_strategy_is_rejected() {
        let f = fixture();
        let strategy = Strategy::oco(
            Symbol::new("BTCUSDT"),
            OrderSide::Sell,
            dec!(0.01),
            dec!(31000),
            dec!(29000),
        );
        let id = f.registry.insert(strategy).unwrap().id().clone();

        let result = f.scheduler.run(id.clone()).await;

        assert!(matches!(result, Err(SchedulerError::NotTwap { .. })));
        let snapshot = f.registry.snapshot(&id).unwrap();
        assert_eq!(snapshot.status(), StrategyStatus::Error);
        assert_eq!(snapshot.errors()[0].kind, ErrorKind::Critical);
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_run_keeps_existing_terminal_status() {
        let f = fixture();
        let strategy = Strategy::oco(
            Symbol::new("BTCUSDT"),
            OrderSide::Sell,
            dec!(0.01),
            dec!(31000),
            dec!(29000),
        );
        let id = f.registry.insert(strategy).unwrap().id().clone();
        f.registry
            .update(&id, |s| s.transition(StrategyStatus::Error))
            .unwrap()
            .unwrap();
        let ended_at = f.registry.snapshot(&id).unwrap().ended_at();

        let result = f.scheduler.run(id.clone()).await;

        assert!(matches!(result, Err(SchedulerError::NotTwap { .. })));
        let snapshot = f.registry.snapshot(&id).unwrap();
        assert_eq!(snapshot.status(), StrategyStatus::Error);
        assert_eq!(snapshot.ended_at(), ended_at);
        assert_eq!(snapshot.errors().len(), 1);
        assert_eq!(snapshot.errors()[0].kind, ErrorKind::Critical);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_strategy_is_an_error() {
        let f = fixture();
        let result = f.scheduler.run(StrategyId::new("TWAP_missing")).await;
        assert!(matches!(result, Err(SchedulerError::Registry(RegistryError::NotFound { .. }))));
    }
}
