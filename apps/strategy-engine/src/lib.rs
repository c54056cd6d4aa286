// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Strategy Engine - Rust Core Library
//!
//! Places and supervises multi-leg trading strategies on top of a
//! single-order exchange primitive.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `order_execution`: Side, order type, time in force, exchange order status
//!   - `strategy`: Strategy aggregate, legs, TWAP plan, lifecycle, validation rules
//!   - `shared`: Identifiers and symbols
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `ExchangeGateway`
//!   - `use_cases`: `ValidateStrategy`, `OcoMonitor`, `TwapScheduler`, `BracketPlacer`
//!   - `services`: `StrategyRegistry`, `StrategyOrchestrator`
//!   - `dto`: Creation requests and cancel acknowledgements
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `exchange`: In-memory `PaperExchange`
//!
//! Cross-cutting: `config` (YAML + env interpolation), `telemetry`
//! (tracing subscriber) and `error` (façade errors and stable codes).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rust_decimal_macros::dec;
//! use strategy_engine::{
//!     CreateOcoDto, OrderSide, PaperExchange, StrategyConfig, StrategyOrchestrator,
//!     StrategyRegistry,
//! };
//!
//! # async fn run() -> Result<(), strategy_engine::OrchestratorError> {
//! let exchange = Arc::new(PaperExchange::new().with_symbol("BTCUSDT", dec!(30000)));
//! let orchestrator = StrategyOrchestrator::new(
//!     exchange,
//!     Arc::new(StrategyRegistry::new()),
//!     StrategyConfig::default(),
//! );
//!
//! let strategy = orchestrator
//!     .create_oco(&CreateOcoDto {
//!         symbol: "BTCUSDT".to_string(),
//!         quantity: dec!(0.01),
//!         take_profit_price: dec!(31000),
//!         stop_loss_price: dec!(29000),
//!         side: OrderSide::Sell,
//!     })
//!     .await?;
//! let result = orchestrator.reconcile_oco(strategy.id()).await?;
//! println!("{:?}", result.outcome);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Façade errors and stable error codes.
pub mod error;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::order_execution::{OrderSide, OrderStatus, OrderType, TimeInForce};
pub use domain::shared::{ExchangeOrderId, StrategyId, Symbol};
pub use domain::strategy::{
    ErrorKind, ErrorRecord, Leg, LegRole, Strategy, StrategyDetails, StrategyKind, StrategyStatus,
    TwapPlan, ValidationError,
};

// Application re-exports
pub use application::dto::{CancelAckDto, CreateBracketDto, CreateOcoDto, CreateTwapDto};
pub use application::ports::{ExchangeGateway, GatewayError, OrderAck, SubmitOrderRequest};
pub use application::services::{RegistryError, StrategyOrchestrator, StrategyRegistry};
pub use application::use_cases::{ReconcileOutcome, ReconcileResult, SchedulerError};

// Infrastructure re-exports
pub use infrastructure::exchange::PaperExchange;

// Cross-cutting re-exports
pub use config::{Config, ConfigError, StrategyConfig, load_config, load_config_from_string};
pub use error::{ErrorCode, OrchestratorError};
pub use telemetry::init_tracing;
