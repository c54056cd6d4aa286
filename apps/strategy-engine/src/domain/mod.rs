//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Services**: Stateless business logic
//!
//! # Bounded Contexts
//!
//! - [`order_execution`]: Exchange order vocabulary (side, type, status, time in force)
//! - [`strategy`]: Multi-leg strategy lifecycle (OCO, TWAP, Bracket)

pub mod order_execution;
pub mod shared;
pub mod strategy;
