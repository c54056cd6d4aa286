//! Strategy Aggregate
//!
//! The Strategy aggregate is the root entity for multi-leg supervision.

mod strategy;

pub use strategy::Strategy;
