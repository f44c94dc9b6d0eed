//! Inventory module: stock items and the thread-safe store that owns them.
//!
//! No IO, no HTTP, no async. Broadcasting changes is the hub's job.

pub mod item;
pub mod sharded;
pub mod store;

pub use item::{StockItem, StockItemDraft, StockItemRecord};
pub use sharded::ShardedStockStore;
pub use store::{InMemoryStockStore, StockStore};
