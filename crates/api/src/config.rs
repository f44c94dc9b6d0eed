//! Process configuration, read once from the environment at startup.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use tracing::warn;

use stockhub_events::HubConfig;

pub const BIND_ADDR: &str = "STOCKHUB_BIND_ADDR";
pub const HUB_QUEUE: &str = "STOCKHUB_HUB_QUEUE";
pub const SUBSCRIBER_BUFFER: &str = "STOCKHUB_SUBSCRIBER_BUFFER";
pub const OVERFLOW_POLICY: &str = "STOCKHUB_OVERFLOW_POLICY";
pub const STORE_SHARDS: &str = "STOCKHUB_STORE_SHARDS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub hub: HubConfig,
    /// `1` selects the single-lock store; more selects the sharded store.
    pub store_shards: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            hub: HubConfig::default(),
            store_shards: 1,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys take defaults; unparsable values are
    /// logged and replaced by defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: parse_or(&lookup, BIND_ADDR, defaults.bind_addr),
            hub: HubConfig {
                queue_capacity: parse_or(&lookup, HUB_QUEUE, defaults.hub.queue_capacity),
                subscriber_buffer: parse_or(
                    &lookup,
                    SUBSCRIBER_BUFFER,
                    defaults.hub.subscriber_buffer,
                ),
                overflow: parse_or(&lookup, OVERFLOW_POLICY, defaults.hub.overflow),
            },
            store_shards: parse_or(&lookup, STORE_SHARDS, defaults.store_shards),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!(key, value = %raw, error = %e, "invalid configuration value; using default");
            default
        }
    }
}
