//! The unit of information pushed to subscribers after a mutation.

use serde::{Deserialize, Serialize};

use stockhub_inventory::StockItem;

/// What happened to the item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }
}

impl core::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape: `{ "type": "CREATE" | "UPDATE" | "DELETE", "payload": StockItem }`.
///
/// For deletes the payload is the record as it was before removal (or, when nothing
/// was stored, the request's item), so it always carries the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(rename = "payload")]
    pub item: StockItem,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, item: StockItem) -> Self {
        Self { kind, item }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
