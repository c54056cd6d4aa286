//! Strategy Orchestrator
//!
//! The façade outer layers talk to. Each `create_*` call validates the
//! request, registers the strategy and hands it to its executor:
//!
//! - **OCO**: both legs are placed before the call returns; reconciliation is
//!   triggered by the caller through [`StrategyOrchestrator::reconcile_oco`].
//! - **TWAP**: a background task is spawned and its join handle retained.
//! - **Bracket**: all three legs are placed before the call returns.
//!
//! A request that fails validation registers nothing and submits nothing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::registry::StrategyRegistry;
use crate::application::dto::{CancelAckDto, CreateBracketDto, CreateOcoDto, CreateTwapDto};
use crate::application::ports::ExchangeGateway;
use crate::application::use_cases::{
    BracketPlacer, OcoMonitor, ReconcileResult, SchedulerError, TwapScheduler,
    ValidateStrategyUseCase,
};
use crate::config::StrategyConfig;
use crate::domain::shared::StrategyId;
use crate::domain::strategy::{Strategy, StrategyError, StrategyKind, StrategyStatus};
use crate::error::OrchestratorError;

type TwapHandle = JoinHandle<Result<StrategyStatus, SchedulerError>>;

/// Validates, registers and launches strategies.
pub struct StrategyOrchestrator<G>
where
    G: ExchangeGateway + 'static,
{
    registry: Arc<StrategyRegistry>,
    validator: ValidateStrategyUseCase<G>,
    oco: OcoMonitor<G>,
    bracket: BracketPlacer<G>,
    twap: Arc<TwapScheduler<G>>,
    tasks: Mutex<HashMap<StrategyId, TwapHandle>>,
}

impl<G> StrategyOrchestrator<G>
where
    G: ExchangeGateway + 'static,
{
    /// Create a new orchestrator over a shared gateway and registry.
    pub fn new(gateway: Arc<G>, registry: Arc<StrategyRegistry>, config: StrategyConfig) -> Self {
        Self {
            validator: ValidateStrategyUseCase::new(Arc::clone(&gateway)),
            oco: OcoMonitor::new(Arc::clone(&gateway), Arc::clone(&registry), config.clone()),
            bracket: BracketPlacer::new(Arc::clone(&gateway), Arc::clone(&registry), config.clone()),
            twap: Arc::new(TwapScheduler::new(gateway, Arc::clone(&registry), config)),
            registry,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Registry shared with the executors.
    #[must_use]
    pub const fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    /// Create an OCO pair and place both legs.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the request is rejected; nothing is
    /// registered in that case.
    pub async fn create_oco(&self, dto: &CreateOcoDto) -> Result<Strategy, OrchestratorError> {
        self.validator.validate_oco(dto).await?;

        let strategy = Strategy::oco(
            dto.symbol(),
            dto.side,
            dto.quantity,
            dto.take_profit_price,
            dto.stop_loss_price,
        );
        let id = self.registry.insert(strategy)?.id().clone();
        tracing::info!(
            strategy_id = %id,
            symbol = %dto.symbol(),
            side = %dto.side,
            quantity = %dto.quantity,
            "OCO created"
        );

        Ok(self.oco.place(&id).await?)
    }

    /// Create a TWAP and start its background task.
    ///
    /// Returns the `ACTIVE` snapshot taken before the first chunk is sent.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the request is rejected.
    pub async fn create_twap(&self, dto: &CreateTwapDto) -> Result<Strategy, OrchestratorError> {
        let plan = self.validator.validate_twap(dto).await?;

        let strategy = Strategy::twap(dto.symbol(), dto.side, plan);
        let id = strategy.id().clone();
        self.registry.insert(strategy)?;
        let snapshot = self.registry.update(&id, |s| {
            s.transition(StrategyStatus::Active)?;
            Ok::<_, StrategyError>(s.clone())
        })??;
        tracing::info!(
            strategy_id = %id,
            symbol = %dto.symbol(),
            side = %dto.side,
            total_quantity = %dto.total_quantity,
            "TWAP created"
        );

        let scheduler = Arc::clone(&self.twap);
        let task_id = id.clone();
        let handle = tokio::spawn(async move { scheduler.run(task_id).await });
        self.tasks.lock().insert(id, handle);

        Ok(snapshot)
    }

    /// Create a bracket and place entry, stop-loss and take-profit.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the request is rejected.
    pub async fn create_bracket(
        &self,
        dto: &CreateBracketDto,
    ) -> Result<Strategy, OrchestratorError> {
        self.validator.validate_bracket(dto).await?;

        let strategy = Strategy::bracket(
            dto.symbol(),
            dto.side,
            dto.quantity,
            dto.entry_price,
            dto.stop_loss_price,
            dto.take_profit_price,
        );
        let id = self.registry.insert(strategy)?.id().clone();
        tracing::info!(
            strategy_id = %id,
            symbol = %dto.symbol(),
            side = %dto.side,
            quantity = %dto.quantity,
            "Bracket created"
        );

        Ok(self.bracket.place(&id).await?)
    }

    /// Current snapshot of a strategy.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub fn get_status(&self, id: &StrategyId) -> Result<Strategy, OrchestratorError> {
        Ok(self.registry.snapshot(id)?)
    }

    /// Request cancellation.
    ///
    /// TWAP cancellation is cooperative: the ack reports the status at the
    /// time of the request and the task stops before its next chunk. An OCO
    /// or bracket still placing its legs is cancelled the same way, by the
    /// placement itself. A terminal strategy is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub async fn cancel(&self, id: &StrategyId) -> Result<CancelAckDto, OrchestratorError> {
        let strategy = self.registry.snapshot(id)?;
        if strategy.is_terminal() {
            return Ok(CancelAckDto::without_orders(id.clone(), strategy.status(), true));
        }

        let ack = match strategy.kind() {
            StrategyKind::Oco => self.oco.cancel(id).await?,
            StrategyKind::Twap | StrategyKind::Bracket => {
                let status = self.registry.request_cancel(id)?;
                CancelAckDto::without_orders(id.clone(), status, status.is_terminal())
            }
        };
        tracing::info!(strategy_id = %id, status = %ack.status, "Cancel requested");
        Ok(ack)
    }

    /// Run one OCO reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID and `WrongKind` for non-OCO
    /// strategies.
    pub async fn reconcile_oco(&self, id: &StrategyId) -> Result<ReconcileResult, OrchestratorError> {
        let strategy = self.registry.snapshot(id)?;
        if strategy.kind() != StrategyKind::Oco {
            return Err(OrchestratorError::WrongKind {
                id: id.clone(),
                expected: StrategyKind::Oco,
                actual: strategy.kind(),
            });
        }
        Ok(self.oco.reconcile(id).await?)
    }

    /// Every registered strategy, oldest first.
    #[must_use]
    pub fn list_strategies(&self) -> Vec<Strategy> {
        self.registry.list()
    }

    /// Strategies not yet in a terminal state.
    #[must_use]
    pub fn active_strategies(&self) -> Vec<Strategy> {
        self.registry.active()
    }

    /// Drop a terminal strategy from the registry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID and a `Registry` error if the
    /// strategy is still running.
    pub fn evict(&self, id: &StrategyId) -> Result<Strategy, OrchestratorError> {
        let evicted = self.registry.evict(id)?;
        self.tasks.lock().remove(id);
        tracing::debug!(strategy_id = %id, "Strategy evicted");
        Ok(evicted)
    }

    /// Wait for a TWAP task to finish and return the final snapshot.
    ///
    /// For other kinds, or a task already awaited, this returns the current
    /// snapshot immediately.
    ///
    /// # Errors
    ///
    /// Returns `Task` if the task panicked and `NotFound` for an unknown ID.
    pub async fn wait_for(&self, id: &StrategyId) -> Result<Strategy, OrchestratorError> {
        let handle = self.tasks.lock().remove(id);
        if let Some(handle) = handle {
            Self::join(id, handle).await?;
        }
        self.get_status(id)
    }

    /// Cancel every running TWAP and wait for the tasks to stop.
    pub async fn shutdown(&self) {
        let tasks: Vec<(StrategyId, TwapHandle)> = self.tasks.lock().drain().collect();
        tracing::info!(tasks = tasks.len(), "Shutting down strategy tasks");

        for (id, _) in &tasks {
            if let Err(e) = self.registry.request_cancel(id) {
                tracing::warn!(strategy_id = %id, error = %e, "Could not request cancel");
            }
        }
        for (id, handle) in tasks {
            if let Err(e) = Self::join(&id, handle).await {
                tracing::warn!(strategy_id = %id, error = %e, "Strategy task ended abnormally");
            }
        }
    }

    async fn join(id: &StrategyId, handle: TwapHandle) -> Result<(), OrchestratorError> {
        match handle.await {
            Ok(Ok(status)) => {
                tracing::debug!(strategy_id = %id, status = %status, "Strategy task joined");
                Ok(())
            }
            // The scheduler already recorded the failure on the strategy.
            Ok(Err(e)) => {
                tracing::warn!(strategy_id = %id, error = %e, "Strategy task failed");
                Ok(())
            }
            Err(e) => Err(OrchestratorError::Task {
                id: id.clone(),
                message: e.to_string(),
            }),
        }
    }
}
