//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up strategy IDs with exchange order IDs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::strategy::StrategyKind;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(StrategyId, "Unique identifier for a supervised strategy.");
define_id!(ExchangeOrderId, "Exchange-assigned identifier for a submitted order.");

impl StrategyId {
    /// Generate a new strategy identifier for the given kind.
    ///
    /// Format: `<KIND>_<yyyymmddHHMMSS>_<uuid>`.
    #[must_use]
    pub fn generate(kind: StrategyKind) -> Self {
        Self(format!(
            "{}_{}_{}",
            kind,
            Utc::now().format("%Y%m%d%H%M%S"),
            uuid::Uuid::new_v4().simple()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_id_new_and_display() {
        let id = StrategyId::new("OCO_1");
        assert_eq!(id.as_str(), "OCO_1");
        assert_eq!(format!("{id}"), "OCO_1");
    }

    #[test]
    fn strategy_id_generate_is_unique() {
        let ids: std::collections::HashSet<_> = (0..1_000)
            .map(|_| StrategyId::generate(StrategyKind::Twap))
            .collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn strategy_id_generate_carries_kind_prefix() {
        let id = StrategyId::generate(StrategyKind::Bracket);
        assert!(id.as_str().starts_with("BRACKET_"));
    }

    #[test]
    fn exchange_order_id_from_string() {
        let id: ExchangeOrderId = "12345".into();
        assert_eq!(id.as_str(), "12345");

        let id: ExchangeOrderId = String::from("67890").into();
        assert_eq!(id.into_inner(), "67890");
    }

    #[test]
    fn exchange_order_id_serde_is_transparent() {
        let id = ExchangeOrderId::new("42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
