//! Shared leg submission and cancellation helpers.

use crate::application::ports::{ExchangeGateway, GatewayError, OrderAck, SubmitOrderRequest};
use crate::application::services::{RegistryError, StrategyRegistry};
use crate::domain::order_execution::{OrderStatus, TimeInForce};
use crate::domain::shared::{ExchangeOrderId, StrategyId, Symbol};
use crate::domain::strategy::{ErrorKind, Leg, LegRole, StrategyStatus};

/// Submit `leg` and record the acknowledgement on it.
///
/// On failure the untouched leg is handed back with the error so callers can
/// still append it for inspection.
pub(crate) async fn submit_leg<G: ExchangeGateway + ?Sized>(
    gateway: &G,
    strategy_id: &StrategyId,
    symbol: &Symbol,
    mut leg: Leg,
    time_in_force: TimeInForce,
) -> Result<(Leg, OrderAck), (Leg, GatewayError)> {
    let request = SubmitOrderRequest::for_leg(symbol.clone(), &leg, time_in_force);

    match gateway.submit_order(request).await {
        Ok(ack) => {
            tracing::info!(
                strategy_id = %strategy_id,
                symbol = %symbol,
                leg = %leg.role,
                order_id = %ack.order_id,
                order_type = %leg.order_type,
                side = %leg.side,
                quantity = %leg.requested_quantity,
                status = %ack.status,
                "Leg submitted"
            );
            leg.mark_placed(ack.order_id.clone(), ack.status, ack.executed_qty);
            Ok((leg, ack))
        }
        Err(e) => {
            tracing::warn!(
                strategy_id = %strategy_id,
                symbol = %symbol,
                leg = %leg.role,
                error = %e,
                "Leg submission failed"
            );
            Err((leg, e))
        }
    }
}

/// Cancel one placed leg.
pub(crate) async fn cancel_leg<G: ExchangeGateway + ?Sized>(
    gateway: &G,
    strategy_id: &StrategyId,
    symbol: &Symbol,
    role: LegRole,
    order_id: &ExchangeOrderId,
) -> Result<(), GatewayError> {
    match gateway.cancel_order(symbol, order_id).await {
        Ok(()) => {
            tracing::info!(
                strategy_id = %strategy_id,
                symbol = %symbol,
                leg = %role,
                order_id = %order_id,
                "Leg cancelled"
            );
            Ok(())
        }
        Err(e) => {
            tracing::warn!(
                strategy_id = %strategy_id,
                symbol = %symbol,
                leg = %role,
                order_id = %order_id,
                error = %e,
                "Leg cancel failed"
            );
            Err(e)
        }
    }
}

/// Outcome of cancelling every placed leg of a strategy.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct LegCancellation {
    pub cancelled: Vec<ExchangeOrderId>,
    pub failed: Vec<ExchangeOrderId>,
    /// Placed legs already known terminal (filled, expired...) before the cancel.
    pub already_closed: usize,
}

impl LegCancellation {
    /// `CANCELLED` only when every placed leg was cancelled by this pass.
    pub(crate) fn terminal_status(&self) -> StrategyStatus {
        if self.failed.is_empty() && self.already_closed == 0 {
            StrategyStatus::Cancelled
        } else {
            StrategyStatus::PartiallyCancelled
        }
    }
}

/// Cancel every live placed leg, best-effort, recording each failure as
/// `failure_kind`.
pub(crate) async fn cancel_live_legs<G: ExchangeGateway + ?Sized>(
    gateway: &G,
    registry: &StrategyRegistry,
    strategy_id: &StrategyId,
    failure_kind: ErrorKind,
) -> Result<LegCancellation, RegistryError> {
    let strategy = registry.snapshot(strategy_id)?;
    let mut outcome = LegCancellation::default();

    for leg in strategy.legs() {
        let Some(order_id) = leg.exchange_order_id.clone() else {
            continue;
        };
        if !leg.is_live() {
            outcome.already_closed += 1;
            continue;
        }

        let role = leg.role;
        match cancel_leg(gateway, strategy_id, strategy.symbol(), role, &order_id).await {
            Ok(()) => {
                registry.update(strategy_id, |s| s.update_leg_status(role, OrderStatus::Canceled))?;
                outcome.cancelled.push(order_id);
            }
            Err(e) => {
                registry.update(strategy_id, |s| {
                    s.record_error(
                        failure_kind,
                        format!("{role} cancel of order {order_id} failed: {e}"),
                    );
                })?;
                outcome.failed.push(order_id);
            }
        }
    }

    Ok(outcome)
}
