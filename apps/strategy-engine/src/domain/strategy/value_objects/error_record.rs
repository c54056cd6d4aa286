//! Timestamped error log entries kept on a strategy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A gateway call failed.
    Gateway,
    /// Some legs were placed and others were not.
    PartialExecution,
    /// Unrecoverable failure; the strategy ends in `ERROR`.
    Critical,
    /// Non-fatal observation (e.g. both OCO legs filled).
    Diagnostic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gateway => write!(f, "GATEWAY"),
            Self::PartialExecution => write!(f, "PARTIAL_EXECUTION"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Diagnostic => write!(f, "DIAGNOSTIC"),
        }
    }
}

/// One entry in a strategy's append-only error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// When the error was recorded.
    pub at: DateTime<Utc>,
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl ErrorRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn now(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
