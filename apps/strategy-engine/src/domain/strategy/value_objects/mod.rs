//! Strategy value objects.

mod error_record;
mod leg;
mod strategy_details;
mod strategy_kind;
mod strategy_status;
mod twap_plan;

pub use error_record::{ErrorKind, ErrorRecord};
pub use leg::{Leg, LegRole};
pub use strategy_details::StrategyDetails;
pub use strategy_kind::StrategyKind;
pub use strategy_status::StrategyStatus;
pub use twap_plan::TwapPlan;
