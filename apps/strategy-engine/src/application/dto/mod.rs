//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for use case inputs/outputs at the orchestrator boundary.

mod strategy_dto;

pub use strategy_dto::{CancelAckDto, CreateBracketDto, CreateOcoDto, CreateTwapDto};
