//! TWAP schedule parameters and progress counters.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::order_execution::OrderType;
use crate::domain::strategy::errors::ValidationError;

/// Seconds per minute.
const SECONDS_PER_MINUTE: i64 = 60;

/// Chunking plan for a TWAP strategy plus its execution progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapPlan {
    /// Total quantity to execute.
    pub total_quantity: Decimal,
    /// Execution window (minutes, fractional allowed).
    pub duration_minutes: Decimal,
    /// Number of chunks.
    pub num_chunks: u32,
    /// Nominal quantity per chunk.
    pub chunk_size: Decimal,
    /// Seconds between chunk submissions.
    pub interval_seconds: Decimal,
    /// Order type per chunk (`MARKET` or `LIMIT`).
    pub order_type: OrderType,
    /// Chunks acknowledged by the exchange.
    pub chunks_executed: u32,
    /// Executed quantity across all chunks.
    pub total_executed: Decimal,
}

impl TwapPlan {
    /// Build a plan.
    ///
    /// When `num_chunks` is `None` the count defaults to the duration in
    /// minutes rounded half-to-even, with a floor of one.
    ///
    /// # Errors
    ///
    /// Returns error if quantity or duration are not positive, the chunk
    /// count is zero, or the order type is neither `MARKET` nor `LIMIT`.
    pub fn new(
        total_quantity: Decimal,
        duration_minutes: Decimal,
        num_chunks: Option<u32>,
        order_type: OrderType,
    ) -> Result<Self, ValidationError> {
        if total_quantity <= Decimal::ZERO {
            return Err(ValidationError::NotPositive {
                name: "quantity".to_string(),
                value: total_quantity,
            });
        }
        if duration_minutes <= Decimal::ZERO {
            return Err(ValidationError::NotPositive {
                name: "duration_minutes".to_string(),
                value: duration_minutes,
            });
        }
        if !matches!(order_type, OrderType::Market | OrderType::Limit) {
            return Err(ValidationError::UnsupportedOrderType { order_type });
        }

        let num_chunks = match num_chunks {
            Some(0) => {
                return Err(ValidationError::InvalidChunkCount {
                    num_chunks: Decimal::ZERO,
                });
            }
            Some(n) => n,
            None => Self::default_chunk_count(duration_minutes).ok_or_else(|| {
                ValidationError::InvalidChunkCount {
                    num_chunks: whole_minutes(duration_minutes),
                }
            })?,
        };

        let chunks = Decimal::from(num_chunks);
        Ok(Self {
            total_quantity,
            duration_minutes,
            num_chunks,
            chunk_size: total_quantity / chunks,
            interval_seconds: duration_minutes * Decimal::from(SECONDS_PER_MINUTE) / chunks,
            order_type,
            chunks_executed: 0,
            total_executed: Decimal::ZERO,
        })
    }

    /// Default chunk count for a window: one chunk per minute, at least one.
    ///
    /// `None` when the window has more minutes than a `u32` can count.
    #[must_use]
    pub fn default_chunk_count(duration_minutes: Decimal) -> Option<u32> {
        whole_minutes(duration_minutes).to_u32().map(|n| n.max(1))
    }

    /// Whether the zero-based chunk `index` is the last one.
    #[must_use]
    pub const fn is_last_chunk(&self, index: u32) -> bool {
        index + 1 >= self.num_chunks
    }

    /// Quantity to submit for chunk `index`.
    ///
    /// The last chunk absorbs rounding: it submits whatever remains of the
    /// total. The result may be zero or negative if earlier chunks overfilled.
    #[must_use]
    pub fn chunk_quantity(&self, index: u32) -> Decimal {
        if self.is_last_chunk(index) {
            self.remaining_quantity()
        } else {
            self.chunk_size
        }
    }

    /// Quantity not yet executed.
    #[must_use]
    pub fn remaining_quantity(&self) -> Decimal {
        self.total_quantity - self.total_executed
    }

    /// Record an acknowledged chunk.
    pub fn record_fill(&mut self, executed: Decimal) {
        self.chunks_executed += 1;
        self.total_executed += executed;
    }

    /// Pause between consecutive chunks.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval_seconds
            .to_f64()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Nominal end of the execution window for a schedule started at `start`.
    #[must_use]
    pub fn expected_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        let millis = (self.duration_minutes * Decimal::from(SECONDS_PER_MINUTE * 1_000))
            .to_i64()
            .unwrap_or(0);
        start + TimeDelta::milliseconds(millis)
    }
}

fn whole_minutes(duration_minutes: Decimal) -> Decimal {
    duration_minutes.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}
