//! OCO Monitor
//!
//! Places a take-profit/stop-loss pair and keeps it one-cancels-other.
//! The monitor owns no background task: reconciliation runs only when a
//! caller invokes [`OcoMonitor::reconcile`].
//!
//! State machine: `CREATED -> LEGS_SUBMITTED -> ACTIVE -> {COMPLETED, PARTIALLY_CANCELLED, CANCELLED}`,
//! with `ERROR` reachable when either leg fails to submit. A cancel that
//! lands while the legs are still going out is honoured by [`OcoMonitor::place`]
//! itself, straight from `LEGS_SUBMITTED`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::leg_submission::{cancel_leg, cancel_live_legs, submit_leg};
use crate::application::dto::CancelAckDto;
use crate::application::ports::ExchangeGateway;
use crate::application::services::{RegistryError, StrategyRegistry};
use crate::config::StrategyConfig;
use crate::domain::order_execution::{OrderStatus, OrderType};
use crate::domain::shared::{ExchangeOrderId, StrategyId, Symbol};
use crate::domain::strategy::{
    ErrorKind, Leg, LegRole, Strategy, StrategyDetails, StrategyError, StrategyStatus,
};

/// What a reconciliation pass observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ReconcileOutcome {
    /// Neither leg filled; strategy stays `ACTIVE`.
    Pending,
    /// Take-profit filled; stop-loss cancel attempted.
    TakeProfitFilled {
        /// Whether the stop-loss cancel succeeded.
        sibling_cancelled: bool,
    },
    /// Stop-loss filled; take-profit cancel attempted.
    StopLossFilled {
        /// Whether the take-profit cancel succeeded.
        sibling_cancelled: bool,
    },
    /// Both legs filled before either could be cancelled.
    BothFilled,
    /// A status lookup failed; nothing was changed.
    StatusUnavailable,
    /// Strategy is not `ACTIVE`; nothing was checked.
    Inactive,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResult {
    /// Strategy ID.
    pub strategy_id: StrategyId,
    /// Outcome.
    pub outcome: ReconcileOutcome,
    /// Take-profit status as fetched, if fetched.
    pub take_profit_status: Option<OrderStatus>,
    /// Stop-loss status as fetched, if fetched.
    pub stop_loss_status: Option<OrderStatus>,
    /// Strategy status after the pass.
    pub strategy_status: StrategyStatus,
}

/// Drives OCO strategies.
pub struct OcoMonitor<G>
where
    G: ExchangeGateway,
{
    gateway: Arc<G>,
    registry: Arc<StrategyRegistry>,
    config: StrategyConfig,
}

impl<G> OcoMonitor<G>
where
    G: ExchangeGateway,
{
    /// Create a new `OcoMonitor`.
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

    /// Submit the take-profit leg, pause, then submit the stop-loss leg.
    ///
    /// A failed submission ends the strategy in `ERROR`. A take-profit that
    /// was already placed is left working and its order ID recorded.
    ///
    /// The cancel flag is checked before each leg and once more, under the
    /// strategy lock, before going `ACTIVE`. If it is set, no further leg is
    /// submitted and the placed ones are cancelled.
    pub async fn place(&self, id: &StrategyId) -> Result<Strategy, RegistryError> {
        let strategy = self.registry.snapshot(id)?;
        let StrategyDetails::Oco {
            take_profit_price,
            stop_loss_price,
        } = *strategy.details()
        else {
            return Err(StrategyError::KindMismatch {
                expected: "OCO".to_string(),
            }
            .into());
        };
        let symbol = strategy.symbol().clone();
        let side = strategy.side();
        let quantity = strategy.quantity();
        let tif = self.config.time_in_force;

        self.registry
            .update(id, |s| s.transition(StrategyStatus::LegsSubmitted))??;
        if self.registry.is_cancel_requested(id)? {
            return self.abandon_placement(id).await;
        }

        let take_profit = Leg::new(LegRole::TakeProfit, side, OrderType::TakeProfit, quantity)
            .with_price(take_profit_price)
            .with_stop_price(take_profit_price);
        let take_profit_id =
            match submit_leg(self.gateway.as_ref(), id, &symbol, take_profit, tif).await {
                Ok((leg, _)) => {
                    let order_id = leg.exchange_order_id.clone();
                    self.registry.update(id, |s| s.push_leg(leg))??;
                    order_id
                }
                Err((leg, e)) => {
                    self.registry.update(id, |s| {
                        s.push_leg(leg)?;
                        s.record_error(
                            ErrorKind::Gateway,
                            format!("take_profit submission failed: {e}"),
                        );
                        s.transition(StrategyStatus::Error)
                    })??;
                    return self.registry.snapshot(id);
                }
            };

        tokio::time::sleep(self.config.oco_leg_delay()).await;
        if self.registry.is_cancel_requested(id)? {
            return self.abandon_placement(id).await;
        }

        let stop_loss = Leg::new(LegRole::StopLoss, side, OrderType::Stop, quantity)
            .with_price(side.marketable_price(stop_loss_price, self.config.stop_limit_buffer_bps))
            .with_stop_price(stop_loss_price);
        match submit_leg(self.gateway.as_ref(), id, &symbol, stop_loss, tif).await {
            Ok((leg, _)) => {
                let activated = self.registry.update_observing_cancel(
                    id,
                    |s: &mut Strategy, cancel_requested: bool| -> Result<bool, StrategyError> {
                        s.push_leg(leg)?;
                        if cancel_requested {
                            return Ok(false);
                        }
                        s.transition(StrategyStatus::Active).map(|()| true)
                    },
                )??;
                if !activated {
                    return self.abandon_placement(id).await;
                }
                tracing::info!(strategy_id = %id, symbol = %symbol, "OCO active");
            }
            Err((leg, e)) => {
                let surviving = take_profit_id
                    .as_ref()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string);
                tracing::error!(
                    strategy_id = %id,
                    symbol = %symbol,
                    order_id = %surviving,
                    "Stop-loss failed, take-profit left working and must be cancelled manually"
                );
                self.registry.update(id, |s| {
                    s.push_leg(leg)?;
                    s.record_error(
                        ErrorKind::PartialExecution,
                        format!(
                            "stop_loss submission failed: {e}; take_profit order {surviving} remains open"
                        ),
                    );
                    s.transition(StrategyStatus::Error)
                })??;
            }
        }

        self.registry.snapshot(id)
    }

    /// Fetch both leg statuses and enforce one-cancels-other.
    pub async fn reconcile(&self, id: &StrategyId) -> Result<ReconcileResult, RegistryError> {
        let strategy = self.registry.snapshot(id)?;
        let inactive = |status| ReconcileResult {
            strategy_id: id.clone(),
            outcome: ReconcileOutcome::Inactive,
            take_profit_status: None,
            stop_loss_status: None,
            strategy_status: status,
        };
        if strategy.status() != StrategyStatus::Active {
            return Ok(inactive(strategy.status()));
        }
        let (Some(tp_id), Some(sl_id)) = (
            placed_order_id(&strategy, LegRole::TakeProfit),
            placed_order_id(&strategy, LegRole::StopLoss),
        ) else {
            return Ok(inactive(strategy.status()));
        };
        let symbol = strategy.symbol().clone();

        let tp = self.gateway.get_order(&symbol, &tp_id).await;
        let sl = self.gateway.get_order(&symbol, &sl_id).await;
        let tp_status = tp.as_ref().ok().map(|ack| ack.status);
        let sl_status = sl.as_ref().ok().map(|ack| ack.status);

        let (tp_status_known, sl_status_known) = match (tp_status, sl_status) {
            (Some(tp_status), Some(sl_status)) => (tp_status, sl_status),
            _ => {
                let errors: Vec<String> = [
                    (LegRole::TakeProfit, tp.err()),
                    (LegRole::StopLoss, sl.err()),
                ]
                .into_iter()
                .filter_map(|(role, err)| {
                    err.map(|e| format!("{role} status lookup failed: {e}"))
                })
                .collect();
                let strategy_status = self.registry.update(id, |s| {
                    if let Some(status) = tp_status {
                        s.update_leg_status(LegRole::TakeProfit, status);
                    }
                    if let Some(status) = sl_status {
                        s.update_leg_status(LegRole::StopLoss, status);
                    }
                    for message in errors {
                        s.record_error(ErrorKind::Gateway, message);
                    }
                    s.status()
                })?;
                tracing::warn!(strategy_id = %id, "OCO reconcile could not read leg statuses");
                return Ok(ReconcileResult {
                    strategy_id: id.clone(),
                    outcome: ReconcileOutcome::StatusUnavailable,
                    take_profit_status: tp_status,
                    stop_loss_status: sl_status,
                    strategy_status,
                });
            }
        };

        self.registry.update(id, |s| {
            s.update_leg_status(LegRole::TakeProfit, tp_status_known);
            s.update_leg_status(LegRole::StopLoss, sl_status_known);
        })?;

        let outcome = match (tp_status_known.is_filled(), sl_status_known.is_filled()) {
            (true, true) => {
                tracing::warn!(strategy_id = %id, "Both OCO legs filled");
                self.registry.update(id, |s| {
                    s.record_error(ErrorKind::Diagnostic, "both legs filled");
                })?;
                ReconcileOutcome::BothFilled
            }
            (true, false) => ReconcileOutcome::TakeProfitFilled {
                sibling_cancelled: self.cancel_sibling(id, &symbol, LegRole::StopLoss, &sl_id).await?,
            },
            (false, true) => ReconcileOutcome::StopLossFilled {
                sibling_cancelled: self
                    .cancel_sibling(id, &symbol, LegRole::TakeProfit, &tp_id)
                    .await?,
            },
            (false, false) => ReconcileOutcome::Pending,
        };

        let strategy_status = if outcome == ReconcileOutcome::Pending {
            StrategyStatus::Active
        } else {
            self.finish(id, StrategyStatus::Completed)?
        };

        Ok(ReconcileResult {
            strategy_id: id.clone(),
            outcome,
            take_profit_status: Some(tp_status_known),
            stop_loss_status: Some(sl_status_known),
            strategy_status,
        })
    }

    /// Cancel every live leg, best-effort.
    ///
    /// Ends in `CANCELLED` only if every placed leg was cancelled here.
    /// A failed cancel, or a leg already known filled or otherwise closed,
    /// ends it `PARTIALLY_CANCELLED`. A strategy still placing its legs only
    /// gets its cancel flag set; [`place`](Self::place) finishes it.
    pub async fn cancel(&self, id: &StrategyId) -> Result<CancelAckDto, RegistryError> {
        let status = self.registry.request_cancel(id)?;
        if status.is_terminal() {
            return Ok(CancelAckDto::without_orders(id.clone(), status, true));
        }
        if status != StrategyStatus::Active {
            return Ok(CancelAckDto::without_orders(id.clone(), status, false));
        }

        let cancellation =
            cancel_live_legs(self.gateway.as_ref(), &self.registry, id, ErrorKind::Gateway).await?;
        let status = self.finish(id, cancellation.terminal_status())?;

        Ok(CancelAckDto {
            strategy_id: id.clone(),
            status,
            already_terminal: false,
            cancelled_orders: cancellation.cancelled,
            failed_orders: cancellation.failed,
        })
    }

    async fn abandon_placement(&self, id: &StrategyId) -> Result<Strategy, RegistryError> {
        tracing::info!(strategy_id = %id, "OCO cancelled during placement");
        let cancellation =
            cancel_live_legs(self.gateway.as_ref(), &self.registry, id, ErrorKind::Gateway).await?;
        self.finish(id, cancellation.terminal_status())?;
        self.registry.snapshot(id)
    }

    async fn cancel_sibling(
        &self,
        id: &StrategyId,
        symbol: &Symbol,
        role: LegRole,
        order_id: &ExchangeOrderId,
    ) -> Result<bool, RegistryError> {
        match cancel_leg(self.gateway.as_ref(), id, symbol, role, order_id).await {
            Ok(()) => {
                self.registry
                    .update(id, |s| s.update_leg_status(role, OrderStatus::Canceled))?;
                Ok(true)
            }
            Err(e) => {
                self.registry.update(id, |s| {
                    s.record_error(
                        ErrorKind::Diagnostic,
                        format!("{role} cancel failed, sibling likely filled: {e}"),
                    );
                })?;
                Ok(false)
            }
        }
    }

    /// Move to a terminal status; a concurrent terminal transition wins.
    fn finish(&self, id: &StrategyId, to: StrategyStatus) -> Result<StrategyStatus, RegistryError> {
        self.registry.update(id, |s| {
            if let Err(e) = s.transition(to) {
                tracing::warn!(strategy_id = %id, error = %e, "OCO transition skipped");
            } else {
                tracing::info!(strategy_id = %id, status = %to, "OCO finished");
            }
            s.status()
        })
    }
}

fn placed_order_id(strategy: &Strategy, role: LegRole) -> Option<ExchangeOrderId> {
    strategy.leg(role).and_then(|leg| leg.exchange_order_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GatewayError;
    use crate::domain::order_execution::OrderSide;
    use crate::infrastructure::exchange::PaperExchange;
    use rust_decimal_macros::dec;

    struct Fixture {
        exchange: Arc<PaperExchange>,
        registry: Arc<StrategyRegistry>,
        monitor: OcoMonitor<PaperExchange>,
    }

    fn fixture() -> Fixture {
        let exchange = Arc::new(PaperExchange::new().with_symbol("BTCUSDT", dec!(30000)));
        let registry = Arc::new(StrategyRegistry::new());
        let monitor = OcoMonitor::new(
            Arc::clone(&exchange),
            Arc::clone(&registry),
            StrategyConfig::default(),
        );
        Fixture {
            exchange,
            registry,
            monitor,
        }
    }

    fn register(registry: &StrategyRegistry) -> StrategyId {
        let strategy = Strategy::oco(
            Symbol::new("BTCUSDT"),
            OrderSide::Sell,
            dec!(0.01),
            dec!(31000),
            dec!(29000),
        );
        registry.insert(strategy).unwrap().id().clone()
    }

    fn order_id(strategy: &Strategy, role: LegRole) -> ExchangeOrderId {
        placed_order_id(strategy, role).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn place_submits_both_legs() {
        let f = fixture();
        let id = register(&f.registry);

        let strategy = f.monitor.place(&id).await.unwrap();
        assert_eq!(strategy.status(), StrategyStatus::Active);
        assert_eq!(strategy.legs().len(), 2);

        let submissions = f.exchange.submissions();
        assert_eq!(submissions[0].order_type, OrderType::TakeProfit);
        assert_eq!(submissions[0].price, Some(dec!(31000)));
        assert_eq!(submissions[0].stop_price, Some(dec!(31000)));
        assert_eq!(submissions[1].order_type, OrderType::Stop);
        assert_eq!(submissions[1].price, Some(dec!(28855)));
        assert_eq!(submissions[1].stop_price, Some(dec!(29000)));
    }

    #[tokio::test(start_paused = true)]
    async fn take_profit_failure_skips_stop_loss() {
        let f = fixture();
        let id = register(&f.registry);
        f.exchange.fail_next_submission(GatewayError::RateLimited);

        let strategy = f.monitor.place(&id).await.unwrap();
        assert_eq!(strategy.status(), StrategyStatus::Error);
        assert_eq!(f.exchange.submissions().len(), 1);
        assert_eq!(strategy.legs().len(), 1);
        assert!(!strategy.legs()[0].is_placed());
        assert_eq!(strategy.errors()[0].kind, ErrorKind::Gateway);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_loss_failure_records_surviving_take_profit() {
        let f = fixture();
        let id = register(&f.registry);
        f.exchange.fail_submission(
            2,
            GatewayError::OrderRejected {
                reason: "would trigger immediately".to_string(),
            },
        );

        let strategy = f.monitor.place(&id).await.unwrap();
        assert_eq!(strategy.status(), StrategyStatus::Error);
        let tp_id = order_id(&strategy, LegRole::TakeProfit);
        assert_eq!(f.exchange.order_status(&tp_id), Some(OrderStatus::New));
        assert_eq!(strategy.errors()[0].kind, ErrorKind::PartialExecution);
        assert!(strategy.errors()[0].message.contains(tp_id.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn reconcile_pending_keeps_active() {
        let f = fixture();
        let id = register(&f.registry);
        f.monitor.place(&id).await.unwrap();

        let result = f.monitor.reconcile(&id).await.unwrap();
        assert_eq!(result.outcome, ReconcileOutcome::Pending);
        assert_eq!(result.strategy_status, StrategyStatus::Active);
        assert_eq!(result.take_profit_status, Some(OrderStatus::New));
    }

    #[tokio::test(start_paused = true)]
    async fn reconcile_take_profit_fill_cancels_stop_loss() {
        let f = fixture();
        let id = register(&f.registry);
        let strategy = f.monitor.place(&id).await.unwrap();
        let tp_id = order_id(&strategy, LegRole::TakeProfit);
        let sl_id = order_id(&strategy, LegRole::StopLoss);
        f.exchange.fill(&tp_id);

        let result = f.monitor.reconcile(&id).await.unwrap();
        assert_eq!(
            result.outcome,
            ReconcileOutcome::TakeProfitFilled {
                sibling_cancelled: true
            }
        );
        assert_eq!(result.strategy_status, StrategyStatus::Completed);
        assert_eq!(f.exchange.order_status(&sl_id), Some(OrderStatus::Canceled));

        let snapshot = f.registry.snapshot(&id).unwrap();
        assert!(snapshot.ended_at().is_some());
        assert_eq!(
            snapshot.leg(LegRole::StopLoss).and_then(|l| l.last_known_status),
            Some(OrderStatus::Canceled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reconcile_tolerates_failed_sibling_cancel() {
        let f = fixture();
        let id = register(&f.registry);
        let strategy = f.monitor.place(&id).await.unwrap();
        let tp_id = order_id(&strategy, LegRole::TakeProfit);
        f.exchange.fail_cancel(&tp_id);
        f.exchange.fill(&order_id(&strategy, LegRole::StopLoss));

        let result = f.monitor.reconcile(&id).await.unwrap();
        assert_eq!(
            result.outcome,
            ReconcileOutcome::StopLossFilled {
                sibling_cancelled: false
            }
        );
        assert_eq!(result.strategy_status, StrategyStatus::Completed);
        let snapshot = f.registry.snapshot(&id).unwrap();
        assert_eq!(snapshot.errors().len(), 1);
        assert_eq!(snapshot.errors()[0].kind, ErrorKind::Diagnostic);
    }

    #[tokio::test(start_paused = true)]
    async fn reconcile_both_filled_cancels_nothing() {
        let f = fixture();
        let id = register(&f.registry);
        let strategy = f.monitor.place(&id).await.unwrap();
        f.exchange.fill(&order_id(&strategy, LegRole::TakeProfit));
        f.exchange.fill(&order_id(&strategy, LegRole::StopLoss));

        let result = f.monitor.reconcile(&id).await.unwrap();
        assert_eq!(result.outcome, ReconcileOutcome::BothFilled);
        assert_eq!(result.strategy_status, StrategyStatus::Completed);
        assert!(f.exchange.cancellations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reconcile_lookup_failure_stays_active() {
        let f = fixture();
        let id = register(&f.registry);
        let strategy = f.monitor.place(&id).await.unwrap();
        f.exchange.fail_lookup(&order_id(&strategy, LegRole::StopLoss));

        let result = f.monitor.reconcile(&id).await.unwrap();
        assert_eq!(result.outcome, ReconcileOutcome::StatusUnavailable);
        assert_eq!(result.strategy_status, StrategyStatus::Active);
        assert_eq!(result.take_profit_status, Some(OrderStatus::New));
        assert!(result.stop_loss_status.is_none());
        assert_eq!(f.registry.snapshot(&id).unwrap().errors().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reconcile_after_terminal_is_inactive() {
        let f = fixture();
        let id = register(&f.registry);
        f.monitor.place(&id).await.unwrap();
        f.monitor.cancel(&id).await.unwrap();
        let submitted = f.exchange.submissions().len();

        let result = f.monitor.reconcile(&id).await.unwrap();
        assert_eq!(result.outcome, ReconcileOutcome::Inactive);
        assert_eq!(result.strategy_status, StrategyStatus::Cancelled);
        assert_eq!(f.exchange.submissions().len(), submitted);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_both_live_legs() {
        let f = fixture();
        let id = register(&f.registry);
        f.monitor.place(&id).await.unwrap();

        let ack = f.monitor.cancel(&id).await.unwrap();
        assert_eq!(ack.status, StrategyStatus::Cancelled);
        assert_eq!(ack.cancelled_orders.len(), 2);
        assert!(ack.failed_orders.is_empty());
        assert!(f.registry.is_cancel_requested(&id).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_with_filled_leg_is_partial() {
        let f = fixture();
        let id = register(&f.registry);
        let strategy = f.monitor.place(&id).await.unwrap();
        let tp_id = order_id(&strategy, LegRole::TakeProfit);
        f.exchange.fill(&tp_id);

        let ack = f.monitor.cancel(&id).await.unwrap();
        assert_eq!(ack.status, StrategyStatus::PartiallyCancelled);
        assert_eq!(ack.failed_orders, vec![tp_id]);
        assert_eq!(ack.cancelled_orders.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_terminal_is_noop() {
        let f = fixture();
        let id = register(&f.registry);
        f.exchange.fail_next_submission(GatewayError::RateLimited);
        f.monitor.place(&id).await.unwrap();

        let ack = f.monitor.cancel(&id).await.unwrap();
        assert!(ack.already_terminal);
        assert_eq!(ack.status, StrategyStatus::Error);
        assert!(f.exchange.cancellations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_reconciled_fill_is_partial() {
        let f = fixture();
        let id = register(&f.registry);
        let strategy = f.monitor.place(&id).await.unwrap();
        let sl_id = order_id(&strategy, LegRole::StopLoss);
        f.exchange.fill(&order_id(&strategy, LegRole::TakeProfit));
        f.exchange.fail_lookup(&sl_id);

        let result = f.monitor.reconcile(&id).await.unwrap();
        assert_eq!(result.outcome, ReconcileOutcome::StatusUnavailable);
        assert_eq!(result.take_profit_status, Some(OrderStatus::Filled));

        let ack = f.monitor.cancel(&id).await.unwrap();
        assert_eq!(ack.status, StrategyStatus::PartiallyCancelled);
        assert_eq!(ack.cancelled_orders, vec![sl_id]);
        assert!(ack.failed_orders.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_requested_before_placement_submits_nothing() {
        let f = fixture();
        let id = register(&f.registry);

        let ack = f.monitor.cancel(&id).await.unwrap();
        assert!(!ack.already_terminal);
        assert_eq!(ack.status, StrategyStatus::Created);

        let strategy = f.monitor.place(&id).await.unwrap();
        assert_eq!(strategy.status(), StrategyStatus::Cancelled);
        assert!(strategy.legs().is_empty());
        assert!(f.exchange.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_leg_delay_skips_stop_loss() {
        let f = fixture();
        let id = register(&f.registry);

        let cancel = async {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            f.monitor.cancel(&id).await.unwrap()
        };
        let (strategy, ack) = tokio::join!(f.monitor.place(&id), cancel);
        let strategy = strategy.unwrap();

        assert!(!ack.already_terminal);
        assert_eq!(ack.status, StrategyStatus::LegsSubmitted);

        assert_eq!(strategy.status(), StrategyStatus::Cancelled);
        assert!(strategy.ended_at().is_some());
        assert_eq!(f.exchange.submissions().len(), 1);
        let tp_id = order_id(&strategy, LegRole::TakeProfit);
        assert_eq!(f.exchange.cancellations(), vec![tp_id.clone()]);
        assert_eq!(f.exchange.order_status(&tp_id), Some(OrderStatus::Canceled));
        assert!(strategy.leg(LegRole::StopLoss).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_leg_delay_with_failed_cancel_is_partial() {
        let f = fixture();
        let id = register(&f.registry);
        f.exchange.fail_cancel(&ExchangeOrderId::new("1"));

        let cancel = async {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            f.monitor.cancel(&id).await.unwrap()
        };
        let (strategy, _) = tokio::join!(f.monitor.place(&id), cancel);
        let strategy = strategy.unwrap();

        assert_eq!(strategy.status(), StrategyStatus::PartiallyCancelled);
        assert_eq!(strategy.errors()[0].kind, ErrorKind::Gateway);
        assert_eq!(f.exchange.submissions().len(), 1);
    }
}
