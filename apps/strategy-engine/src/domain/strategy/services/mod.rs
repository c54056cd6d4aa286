//! Strategy domain services.

mod validator;

pub use validator::StrategyValidator;
