//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the application layer:
//!
//! - **Driven Adapters (Outbound)**
//!   - `exchange/`: Exchange gateway adapters (in-memory paper exchange)

pub mod exchange;
