use std::sync::Arc;

use tracing::info;

use stockhub_events::Hub;
use stockhub_infra::MutationDispatcher;
use stockhub_inventory::{InMemoryStockStore, ShardedStockStore, StockStore};

use crate::config::ApiConfig;

/// Store shared by every request path.
pub type SharedStore = Arc<dyn StockStore>;

/// Service objects constructed once at startup and handed to every handler.
pub struct AppServices {
    dispatcher: MutationDispatcher<SharedStore>,
}

impl AppServices {
    pub fn build(config: &ApiConfig) -> Self {
        let store: SharedStore = if config.store_shards > 1 {
            Arc::new(ShardedStockStore::new(config.store_shards))
        } else {
            Arc::new(InMemoryStockStore::new())
        };

        // The loop runs until the last Hub handle (owned by the dispatcher) is dropped.
        let (hub, _broadcast) = Hub::spawn(config.hub);

        info!(
            store_shards = config.store_shards.max(1),
            hub_queue = config.hub.queue_capacity,
            subscriber_buffer = config.hub.subscriber_buffer,
            overflow = ?config.hub.overflow,
            "services initialized"
        );

        Self {
            dispatcher: MutationDispatcher::new(store, hub),
        }
    }

    pub fn dispatcher(&self) -> &MutationDispatcher<SharedStore> {
        &self.dispatcher
    }

    pub fn hub(&self) -> &Hub {
        self.dispatcher.hub()
    }
}
