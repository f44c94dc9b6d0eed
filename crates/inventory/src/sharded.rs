//! Id-hash sharded store for write-heavy workloads.

use std::hash::{BuildHasher, RandomState};

use stockhub_core::StockItemId;

use crate::item::{StockItem, StockItemDraft};
use crate::store::{InMemoryStockStore, StockStore};

/// `N` independent single-lock stores, picked by hashing the item id.
///
/// Same external contract as [`InMemoryStockStore`]. Writers lock one shard; whole-store
/// reads take every shard's read lock in index order before copying, so a snapshot is a
/// state the store actually held.
#[derive(Debug)]
pub struct ShardedStockStore {
    shards: Vec<InMemoryStockStore>,
    hasher: RandomState,
}

impl ShardedStockStore {
    /// `shards` is clamped to at least one.
    pub fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| InMemoryStockStore::new()).collect(),
            hasher: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, id: &StockItemId) -> usize {
        (self.hasher.hash_one(id) % self.shards.len() as u64) as usize
    }

    fn shard_for(&self, id: &StockItemId) -> &InMemoryStockStore {
        &self.shards[self.shard_index(id)]
    }
}

impl StockStore for ShardedStockStore {
    fn snapshot(&self) -> Vec<StockItem> {
        let guards: Vec<_> = self.shards.iter().map(|s| s.read()).collect();
        guards.iter().flat_map(|map| map.values().cloned()).collect()
    }

    fn get(&self, id: &StockItemId) -> Option<StockItem> {
        self.shard_for(id).get(id)
    }

    fn create(&self, draft: StockItemDraft) -> StockItem {
        let item = draft.with_id(StockItemId::mint());
        self.shard_for(&item.id).insert(item)
    }

    fn update(&self, item: StockItem) -> StockItem {
        self.shard_for(&item.id).insert(item)
    }

    fn delete(&self, id: &StockItemId) -> Option<StockItem> {
        self.shard_for(id).delete(id)
    }

    fn len(&self) -> usize {
        let guards: Vec<_> = self.shards.iter().map(|s| s.read()).collect();
        guards.iter().map(|map| map.len()).sum()
    }
}
