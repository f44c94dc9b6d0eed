use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use stockhub_core::StockItemId;

use crate::item::{StockItem, StockItemDraft};

/// Authoritative id → item map.
///
/// Reads return copies; nothing outside the store ever holds a reference into it.
/// Mutations are O(1) and perform no IO while the write lock is held.
pub trait StockStore: Send + Sync {
    /// Point-in-time copy of every item, order unspecified.
    fn snapshot(&self) -> Vec<StockItem>;

    fn get(&self, id: &StockItemId) -> Option<StockItem>;

    /// Mint a fresh id, insert, and return the stored item.
    fn create(&self, draft: StockItemDraft) -> StockItem;

    /// Overwrite the record at `item.id`, inserting it when absent (upsert).
    fn update(&self, item: StockItem) -> StockItem;

    /// Remove the record at `id`. Removing an absent id is a no-op.
    fn delete(&self, id: &StockItemId) -> Option<StockItem>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    fn snapshot(&self) -> Vec<StockItem> {
        (**self).snapshot()
    }

    fn get(&self, id: &StockItemId) -> Option<StockItem> {
        (**self).get(id)
    }

    fn create(&self, draft: StockItemDraft) -> StockItem {
        (**self).create(draft)
    }

    fn update(&self, item: StockItem) -> StockItem {
        (**self).update(item)
    }

    fn delete(&self, id: &StockItemId) -> Option<StockItem> {
        (**self).delete(id)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Single-lock in-memory store.
///
/// Any number of readers proceed concurrently; a writer excludes everyone else for
/// the duration of one map operation. A poisoned lock is recovered rather than
/// propagated: every write is a single insert/remove, so the map is never left
/// half-updated.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    inner: RwLock<HashMap<StockItemId, StockItem>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared read access to the whole map, held until the guard drops.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, HashMap<StockItemId, StockItem>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an item whose id was minted elsewhere.
    pub(crate) fn insert(&self, item: StockItem) -> StockItem {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(item.id.clone(), item.clone());
        item
    }
}

impl StockStore for InMemoryStockStore {
    fn snapshot(&self) -> Vec<StockItem> {
        self.read().values().cloned().collect()
    }

    fn get(&self, id: &StockItemId) -> Option<StockItem> {
        self.read().get(id).cloned()
    }

    fn create(&self, draft: StockItemDraft) -> StockItem {
        self.insert(draft.with_id(StockItemId::mint()))
    }

    fn update(&self, item: StockItem) -> StockItem {
        self.insert(item)
    }

    fn delete(&self, id: &StockItemId) -> Option<StockItem> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(id)
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}
