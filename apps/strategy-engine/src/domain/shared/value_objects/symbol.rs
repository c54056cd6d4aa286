//! Symbol value object for tradable pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::strategy::ValidationError;

/// Maximum accepted symbol length.
const MAX_SYMBOL_LEN: usize = 32;

/// A trading symbol (e.g. "BTCUSDT", "ETHUSDT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is trimmed and normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the symbol shape before any exchange lookup.
    ///
    /// # Errors
    ///
    /// Returns error if symbol is empty, too long or contains invalid characters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let reason = if self.0.is_empty() {
            "symbol cannot be empty"
        } else if self.0.len() > MAX_SYMBOL_LEN {
            "symbol exceeds maximum length"
        } else if !self.0.chars().all(|c| c.is_ascii_alphanumeric()) {
            "symbol contains invalid characters"
        } else {
            return Ok(());
        };

        Err(ValidationError::InvalidSymbol {
            symbol: self.0.clone(),
            reason: reason.to_string(),
        })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
