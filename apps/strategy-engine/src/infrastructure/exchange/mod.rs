//! Exchange gateway adapters.

mod paper;

pub use paper::PaperExchange;
