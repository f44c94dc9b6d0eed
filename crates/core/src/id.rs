//! Strongly-typed identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Identifier of a stock item.
///
/// Server-minted ids are UUIDv7 text, but any non-blank string is accepted so that
/// updates can target (and upsert) ids chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StockItemId(String);

impl StockItemId {
    /// Mint a fresh, globally unique identifier.
    pub fn mint() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Validate a caller-supplied identifier.
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::invalid_input("id is required"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for StockItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StockItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StockItemId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StockItemId> for String {
    fn from(value: StockItemId) -> Self {
        value.0
    }
}

impl FromStr for StockItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identifier of one live subscriber connection (UUIDv7, time-ordered).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_unique_and_non_blank() {
        let a = StockItemId::mint();
        let b = StockItemId::mint();
        assert_ne!(a, b);
        assert!(!a.as_str().trim().is_empty());
    }

    #[test]
    fn blank_ids_are_rejected() {
        for raw in ["", "   ", "\t"] {
            match StockItemId::parse(raw) {
                Err(DomainError::InvalidInput(_)) => {}
                other => panic!("expected InvalidInput for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn caller_chosen_ids_are_kept_verbatim() {
        let id: StockItemId = "sku-42".parse().unwrap();
        assert_eq!(id.as_str(), "sku-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sku-42\"");
    }

    #[test]
    fn deserializing_blank_id_fails() {
        assert!(serde_json::from_str::<StockItemId>("\"\"").is_err());
    }

    #[test]
    fn subscriber_ids_are_distinct_and_print_as_uuids() {
        let a = SubscriberId::new();
        let b = SubscriberId::default();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a.to_string()).is_ok());
    }
}
