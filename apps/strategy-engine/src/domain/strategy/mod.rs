//! Strategy Bounded Context
//!
//! A strategy is the unit of supervision: one OCO pair, one TWAP schedule or
//! one bracket, together with every exchange order (leg) it has submitted.
//!
//! # Key Concepts
//!
//! - **Strategy Aggregate**: owns its legs, its status and an append-only error log
//! - **State machines**: each [`StrategyKind`] permits its own status transitions
//! - **Terminal states**: once reached, no leg may be added and the status is frozen
//! - **Validator**: pure pre-submission checks (positivity, price ordering, chunk size)

pub mod aggregate;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use aggregate::Strategy;
pub use errors::{PriceRelation, StrategyError, ValidationError};
pub use services::StrategyValidator;
pub use value_objects::{
    ErrorKind, ErrorRecord, Leg, LegRole, StrategyDetails, StrategyKind, StrategyStatus, TwapPlan,
};
