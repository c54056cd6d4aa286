//! Order Execution Vocabulary
//!
//! The single-order primitives every strategy leg is expressed in: side,
//! order type, time in force and the exchange-reported order status.

pub mod value_objects;

pub use value_objects::{OrderSide, OrderStatus, OrderType, TimeInForce};
