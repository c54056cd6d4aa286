//! Strategy execution policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::order_execution::TimeInForce;

/// Policy constants applied by the strategy executors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Pause between the OCO take-profit and stop-loss submissions (milliseconds).
    #[serde(default = "default_oco_leg_delay_ms")]
    pub oco_leg_delay_ms: u64,
    /// Limit price buffer beyond the trigger for stop legs (basis points).
    #[serde(default = "default_stop_limit_buffer_bps")]
    pub stop_limit_buffer_bps: u32,
    /// Favourable offset from the current price for LIMIT TWAP chunks (basis points).
    #[serde(default = "default_twap_limit_offset_bps")]
    pub twap_limit_offset_bps: u32,
    /// Time in force for resting legs.
    #[serde(default)]
    pub time_in_force: TimeInForce,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            oco_leg_delay_ms: default_oco_leg_delay_ms(),
            stop_limit_buffer_bps: default_stop_limit_buffer_bps(),
            twap_limit_offset_bps: default_twap_limit_offset_bps(),
            time_in_force: TimeInForce::default(),
        }
    }
}

impl StrategyConfig {
    /// Pause between OCO leg submissions.
    #[must_use]
    pub const fn oco_leg_delay(&self) -> Duration {
        Duration::from_millis(self.oco_leg_delay_ms)
    }
}

const fn default_oco_leg_delay_ms() -> u64 {
    100
}

const fn default_stop_limit_buffer_bps() -> u32 {
    50
}

const fn default_twap_limit_offset_bps() -> u32 {
    10
}
