//! Application Use Cases
//!
//! Use cases drive one strategy kind each from creation to a terminal state,
//! plus the pre-submission validation shared by all of them.

mod bracket_placer;
mod leg_submission;
mod oco_monitor;
mod twap_scheduler;
mod validate_strategy;

pub use bracket_placer::BracketPlacer;
pub use oco_monitor::{OcoMonitor, ReconcileOutcome, ReconcileResult};
pub use twap_scheduler::{SchedulerError, TwapScheduler};
pub use validate_strategy::ValidateStrategyUseCase;
