use serde::{Deserialize, Serialize};

use stockhub_core::{DomainError, DomainResult, StockItemId};

/// A stock item as held by the store and sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: StockItemId,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

/// The mutable fields of a stock item, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct StockItemDraft {
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

impl StockItemDraft {
    pub fn new(name: impl Into<String>, unit_price: f64, quantity: i64) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    pub fn with_id(self, id: StockItemId) -> StockItem {
        StockItem {
            id,
            name: self.name,
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

/// A StockItem-shaped record decoded from a request body.
///
/// Every field is optional on the wire; absent fields take their zero value. Only
/// malformed JSON or mistyped fields fail decoding. Whether `id` is required depends
/// on the operation, see [`StockItemRecord::require_id`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StockItemRecord {
    pub id: Option<String>,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

impl StockItemRecord {
    /// Decode a request body.
    pub fn decode(body: &[u8]) -> DomainResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| DomainError::invalid_input(format!("malformed stock item: {e}")))
    }

    /// The record's id, or `InvalidInput` when it is absent or blank.
    pub fn require_id(&self) -> DomainResult<StockItemId> {
        match &self.id {
            Some(raw) => StockItemId::parse(raw.clone()),
            None => Err(DomainError::invalid_input("id is required")),
        }
    }

    /// Mutable fields only; any id in the body is ignored.
    pub fn draft(&self) -> StockItemDraft {
        StockItemDraft::new(self.name.clone(), self.unit_price, self.quantity)
    }

    /// Full item with a validated id.
    pub fn into_item(self) -> DomainResult<StockItem> {
        let id = self.require_id()?;
        Ok(self.draft().with_id(id))
    }
}
