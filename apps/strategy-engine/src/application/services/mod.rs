//! Application Services
//!
//! Long-lived components shared by the use cases: the strategy registry and
//! the orchestrator façade that owns the background TWAP tasks.

mod orchestrator;
mod registry;

pub use orchestrator::StrategyOrchestrator;
pub use registry::{RegistryError, StrategyEntry, StrategyRegistry};
