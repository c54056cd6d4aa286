//! Strategy Registry
//!
//! Concurrent store mapping a strategy ID to its mutable state. It is the
//! single source of truth: executors write through [`StrategyRegistry::update`]
//! and callers read copies through [`StrategyRegistry::snapshot`].
//!
//! Locking: the map lock is only held long enough to clone an entry's `Arc`;
//! each strategy then has its own mutex. Neither lock is ever held across an
//! `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::shared::StrategyId;
use crate::domain::strategy::{Strategy, StrategyError, StrategyStatus};

/// Registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No strategy with this ID.
    #[error("strategy not found: {id}")]
    NotFound {
        /// Requested ID.
        id: StrategyId,
    },

    /// A strategy with this ID is already registered.
    #[error("strategy already registered: {id}")]
    Duplicate {
        /// Conflicting ID.
        id: StrategyId,
    },

    /// Only terminal strategies may be evicted.
    #[error("strategy {id} is still {status}")]
    NotTerminal {
        /// Strategy ID.
        id: StrategyId,
        /// Current status.
        status: StrategyStatus,
    },

    /// Aggregate rejected a mutation.
    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

/// One registered strategy plus its cooperative cancel flag.
#[derive(Debug)]
pub struct StrategyEntry {
    strategy: Mutex<Strategy>,
    cancel: CancellationToken,
}

impl StrategyEntry {
    fn new(strategy: Strategy) -> Self {
        Self {
            strategy: Mutex::new(strategy),
            cancel: CancellationToken::new(),
        }
    }
}

/// Concurrent-safe strategy store owned by the orchestrator.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    entries: RwLock<HashMap<StrategyId, Arc<StrategyEntry>>>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new strategy and return its snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is already registered.
    pub fn insert(&self, strategy: Strategy) -> Result<Strategy, RegistryError> {
        let id = strategy.id().clone();
        let snapshot = strategy.clone();

        let mut entries = self.entries.write();
        if entries.contains_key(&id) {
            return Err(RegistryError::Duplicate { id });
        }
        entries.insert(id, Arc::new(StrategyEntry::new(strategy)));
        Ok(snapshot)
    }

    /// Copy of the current strategy state.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is not registered.
    pub fn snapshot(&self, id: &StrategyId) -> Result<Strategy, RegistryError> {
        Ok(self.entry(id)?.strategy.lock().clone())
    }

    /// Mutate a strategy under its lock.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is not registered.
    pub fn update<R>(
        &self,
        id: &StrategyId,
        f: impl FnOnce(&mut Strategy) -> R,
    ) -> Result<R, RegistryError> {
        let entry = self.entry(id)?;
        let mut strategy = entry.strategy.lock();
        Ok(f(&mut strategy))
    }

    /// Mutate a strategy under its lock, also passing whether cancellation
    /// has been requested.
    ///
    /// The flag is read under the same lock [`request_cancel`](Self::request_cancel)
    /// sets it under, so a cancel either lands before `f` runs or observes
    /// the status `f` leaves behind.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is not registered.
    pub fn update_observing_cancel<R>(
        &self,
        id: &StrategyId,
        f: impl FnOnce(&mut Strategy, bool) -> R,
    ) -> Result<R, RegistryError> {
        let entry = self.entry(id)?;
        let mut strategy = entry.strategy.lock();
        Ok(f(&mut strategy, entry.cancel.is_cancelled()))
    }

    /// Set the cooperative cancel flag and return the status it was set
    /// against. Terminal strategies are left untouched.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is not registered.
    pub fn request_cancel(&self, id: &StrategyId) -> Result<StrategyStatus, RegistryError> {
        let entry = self.entry(id)?;
        let strategy = entry.strategy.lock();
        if !strategy.is_terminal() {
            entry.cancel.cancel();
        }
        Ok(strategy.status())
    }

    /// Whether cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is not registered.
    pub fn is_cancel_requested(&self, id: &StrategyId) -> Result<bool, RegistryError> {
        Ok(self.entry(id)?.cancel.is_cancelled())
    }

    /// Clone of the strategy's cancel token, for awaiting in `select!`.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is not registered.
    pub fn cancel_token(&self, id: &StrategyId) -> Result<CancellationToken, RegistryError> {
        Ok(self.entry(id)?.cancel.clone())
    }

    /// Remove a terminal strategy and return its final state.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is not registered or not terminal.
    pub fn evict(&self, id: &StrategyId) -> Result<Strategy, RegistryError> {
        let mut entries = self.entries.write();
        let entry = entries
            .get(id)
            .ok_or_else(|| RegistryError::NotFound { id: id.clone() })?;

        let status = entry.strategy.lock().status();
        if !status.is_terminal() {
            return Err(RegistryError::NotTerminal {
                id: id.clone(),
                status,
            });
        }

        let entry = entries
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound { id: id.clone() })?;
        let strategy = entry.strategy.lock().clone();
        Ok(strategy)
    }

    /// Snapshots of every strategy, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<Strategy> {
        let entries: Vec<Arc<StrategyEntry>> = self.entries.read().values().cloned().collect();
        let mut strategies: Vec<Strategy> = entries
            .iter()
            .map(|entry| entry.strategy.lock().clone())
            .collect();
        strategies.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        strategies
    }

    /// Snapshots of strategies not yet terminal, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<Strategy> {
        self.list()
            .into_iter()
            .filter(|strategy| !strategy.is_terminal())
            .collect()
    }

    /// Number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn entry(&self, id: &StrategyId) -> Result<Arc<StrategyEntry>, RegistryError> {
        self.entries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound { id: id.clone() })
    }
}
