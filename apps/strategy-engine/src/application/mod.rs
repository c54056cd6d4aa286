//! Application Layer
//!
//! The application layer drives strategy aggregates through their lifecycle.
//! It defines:
//!
//! - **Ports**: The exchange gateway the executors submit through
//! - **Use Cases**: Validation plus the OCO, TWAP and bracket executors
//! - **Services**: The strategy registry and the orchestrator façade
//! - **DTOs**: Creation requests and cancel acknowledgements

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
