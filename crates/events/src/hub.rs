//! Broadcast hub (subscriber registry + single broadcast loop).
//!
//! The registry is owned by exactly one task, the broadcast loop. Everything else talks
//! to it through [`Hub`], a cheap cloneable handle that only sends messages:
//!
//! ```text
//! register / unregister / publish ──► command queue ──► broadcast loop ──► per-subscriber queues
//! ```
//!
//! Commands are handled strictly in arrival order, so events go out in publish order and
//! a subscriber registered before a publish (by the same caller) always sees it.
//! Subscribers registered concurrently with a publish may or may not.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use stockhub_core::SubscriberId;

use crate::change::ChangeEvent;
use crate::subscriber::{Delivery, OverflowPolicy, Subscriber, Subscription};

/// Default capacity of the hub command queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default capacity of each subscriber's outbound queue.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

/// Hub sizing and overflow behaviour.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Pending register/unregister/publish commands before `publish` waits.
    pub queue_capacity: usize,
    /// Events buffered per subscriber before the overflow policy applies.
    pub subscriber_buffer: usize,
    pub overflow: OverflowPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            overflow: OverflowPolicy::default(),
        }
    }
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The broadcast loop has stopped (runtime shutting down).
    #[error("broadcast hub is closed")]
    Closed,
}

#[derive(Debug)]
enum HubCommand {
    Register(Subscriber),
    Unregister(SubscriberId),
    Publish(ChangeEvent),
    Count(oneshot::Sender<usize>),
}

/// Handle to the broadcast loop.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::Sender<HubCommand>,
    config: HubConfig,
}

impl Hub {
    /// Spawn the broadcast loop on the current tokio runtime.
    ///
    /// The loop runs until every `Hub` clone has been dropped.
    pub fn spawn(config: HubConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let broadcast = BroadcastLoop {
            commands: rx,
            registry: HashMap::new(),
            overflow: config.overflow,
        };
        let join = tokio::spawn(broadcast.run());

        (
            Self {
                commands: tx,
                config,
            },
            join,
        )
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Create a subscriber with the configured buffer and register it.
    pub async fn subscribe(&self) -> Result<Subscription, HubError> {
        let (subscriber, subscription) = Subscriber::pair(self.config.subscriber_buffer);
        self.register(subscriber).await?;
        Ok(subscription)
    }

    pub async fn register(&self, subscriber: Subscriber) -> Result<(), HubError> {
        self.send(HubCommand::Register(subscriber)).await
    }

    /// Idempotent: unknown ids are ignored.
    pub async fn unregister(&self, id: SubscriberId) -> Result<(), HubError> {
        self.send(HubCommand::Unregister(id)).await
    }

    /// Hand the event to the broadcast loop. Waits only for queue capacity, never for
    /// delivery.
    pub async fn publish(&self, event: ChangeEvent) -> Result<(), HubError> {
        self.send(HubCommand::Publish(event)).await
    }

    /// Wait for a slot in the command queue without sending anything yet.
    ///
    /// The returned permit publishes synchronously, so a caller can reserve first and
    /// then commit a side effect and its event with no suspension point in between.
    /// Dropping the permit unused gives the slot back.
    pub async fn reserve(&self) -> Result<PublishPermit<'_>, HubError> {
        let permit = self.commands.reserve().await.map_err(|_| HubError::Closed)?;
        Ok(PublishPermit { permit })
    }

    /// Registry size as seen by the loop after all previously sent commands.
    pub async fn subscriber_count(&self) -> Result<usize, HubError> {
        let (tx, rx) = oneshot::channel();
        self.send(HubCommand::Count(tx)).await?;
        rx.await.map_err(|_| HubError::Closed)
    }

    async fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands.send(command).await.map_err(|_| HubError::Closed)
    }
}

/// One reserved slot in the hub command queue.
#[derive(Debug)]
pub struct PublishPermit<'a> {
    permit: mpsc::Permit<'a, HubCommand>,
}

impl PublishPermit<'_> {
    /// Enqueue the event in the reserved slot. Never waits.
    pub fn publish(self, event: ChangeEvent) {
        self.permit.send(HubCommand::Publish(event));
    }
}

struct BroadcastLoop {
    commands: mpsc::Receiver<HubCommand>,
    registry: HashMap<SubscriberId, Subscriber>,
    overflow: OverflowPolicy,
}

impl BroadcastLoop {
    async fn run(mut self) {
        info!(overflow = ?self.overflow, "hub broadcast loop started");

        while let Some(command) = self.commands.recv().await {
            match command {
                HubCommand::Register(subscriber) => {
                    debug!(subscriber_id = %subscriber.id(), "subscriber registered");
                    self.registry.insert(subscriber.id(), subscriber);
                }
                HubCommand::Unregister(id) => {
                    if self.registry.remove(&id).is_some() {
                        debug!(subscriber_id = %id, "subscriber unregistered");
                    }
                }
                HubCommand::Publish(event) => self.broadcast(event),
                HubCommand::Count(reply) => {
                    let _ = reply.send(self.registry.len());
                }
            }
        }

        info!(
            remaining = self.registry.len(),
            "hub broadcast loop stopped"
        );
    }

    /// Offer one event to every registered subscriber; drop the ones that fail.
    fn broadcast(&mut self, event: ChangeEvent) {
        let event = Arc::new(event);
        let mut dropped = Vec::new();

        for (id, subscriber) in &self.registry {
            match subscriber.offer(&event, self.overflow) {
                Delivery::Delivered => {}
                Delivery::Skipped => {
                    debug!(subscriber_id = %id, kind = %event.kind, "subscriber queue full; event skipped");
                }
                Delivery::Dropped(reason) => {
                    warn!(subscriber_id = %id, %reason, "dropping subscriber");
                    dropped.push(*id);
                }
            }
        }

        // Removing the hub-side sender closes the queue; the connection ends after draining it.
        for id in dropped {
            self.registry.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::change::ChangeKind;
    use stockhub_inventory::StockItemDraft;

    fn event(kind: ChangeKind, n: i64) -> ChangeEvent {
        let item = StockItemDraft::new(format!("item-{n}"), 1.0, n)
            .with_id(format!("id-{n}").parse().unwrap());
        ChangeEvent::new(kind, item)
    }

    async fn next(sub: &mut Subscription) -> Arc<ChangeEvent> {
        tokio::time::timeout(Duration::from_secs(2), sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("subscriber queue closed")
    }

    async fn closed(sub: &mut Subscription) -> bool {
        tokio::time::timeout(Duration::from_secs(2), sub.recv())
            .await
            .expect("timed out waiting for close")
            .is_none()
    }

    #[tokio::test]
    async fn every_subscriber_receives_events_in_publish_order() {
        let (hub, _loop) = Hub::spawn(HubConfig::default());
        let mut s1 = hub.subscribe().await.unwrap();
        let mut s2 = hub.subscribe().await.unwrap();

        hub.publish(event(ChangeKind::Create, 1)).await.unwrap();
        hub.publish(event(ChangeKind::Update, 2)).await.unwrap();
        hub.publish(event(ChangeKind::Delete, 3)).await.unwrap();

        for sub in [&mut s1, &mut s2] {
            let got: Vec<_> = [next(sub).await, next(sub).await, next(sub).await]
                .iter()
                .map(|e| (e.kind, e.item.quantity))
                .collect();
            assert_eq!(
                got,
                vec![
                    (ChangeKind::Create, 1),
                    (ChangeKind::Update, 2),
                    (ChangeKind::Delete, 3)
                ]
            );
            assert!(sub.try_recv().is_err(), "no duplicates");
        }
    }

    #[tokio::test]
    async fn broken_subscriber_is_removed_and_others_keep_receiving() {
        let (hub, _loop) = Hub::spawn(HubConfig::default());
        let mut s1 = hub.subscribe().await.unwrap();
        let mut s2 = hub.subscribe().await.unwrap();

        hub.publish(event(ChangeKind::Create, 1)).await.unwrap();
        assert_eq!(next(&mut s1).await.item.quantity, 1);
        assert_eq!(next(&mut s2).await.item.quantity, 1);

        drop(s1);

        hub.publish(event(ChangeKind::Update, 2)).await.unwrap();
        hub.publish(event(ChangeKind::Update, 3)).await.unwrap();

        assert_eq!(next(&mut s2).await.item.quantity, 2);
        assert_eq!(next(&mut s2).await.item.quantity, 3);
        assert_eq!(hub.subscriber_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unregister_is_idempotent_and_closes_the_queue() {
        let (hub, _loop) = Hub::spawn(HubConfig::default());
        let mut sub = hub.subscribe().await.unwrap();
        assert_eq!(hub.subscriber_count().await.unwrap(), 1);

        hub.unregister(sub.id()).await.unwrap();
        hub.unregister(sub.id()).await.unwrap();

        assert_eq!(hub.subscriber_count().await.unwrap(), 0);
        assert!(closed(&mut sub).await);
    }

    #[tokio::test]
    async fn late_subscriber_does_not_see_earlier_events() {
        let (hub, _loop) = Hub::spawn(HubConfig::default());
        let mut early = hub.subscribe().await.unwrap();

        hub.publish(event(ChangeKind::Create, 1)).await.unwrap();
        let mut late = hub.subscribe().await.unwrap();
        hub.publish(event(ChangeKind::Create, 2)).await.unwrap();

        assert_eq!(next(&mut early).await.item.quantity, 1);
        assert_eq!(next(&mut early).await.item.quantity, 2);
        assert_eq!(next(&mut late).await.item.quantity, 2);
    }

    #[tokio::test]
    async fn overflow_disconnects_slow_subscriber_by_default() {
        let (hub, _loop) = Hub::spawn(HubConfig {
            subscriber_buffer: 1,
            ..HubConfig::default()
        });
        let mut slow = hub.subscribe().await.unwrap();
        let mut fast = hub.subscribe().await.unwrap();

        hub.publish(event(ChangeKind::Create, 1)).await.unwrap();
        assert_eq!(next(&mut fast).await.item.quantity, 1);
        hub.publish(event(ChangeKind::Create, 2)).await.unwrap();
        assert_eq!(next(&mut fast).await.item.quantity, 2);

        assert_eq!(hub.subscriber_count().await.unwrap(), 1);
        assert_eq!(next(&mut slow).await.item.quantity, 1);
        assert!(closed(&mut slow).await);
    }

    #[tokio::test]
    async fn drop_newest_keeps_slow_subscriber_registered() {
        let (hub, _loop) = Hub::spawn(HubConfig {
            subscriber_buffer: 1,
            overflow: OverflowPolicy::DropNewest,
            ..HubConfig::default()
        });
        let mut slow = hub.subscribe().await.unwrap();

        hub.publish(event(ChangeKind::Create, 1)).await.unwrap();
        hub.publish(event(ChangeKind::Create, 2)).await.unwrap();
        assert_eq!(hub.subscriber_count().await.unwrap(), 1);

        assert_eq!(next(&mut slow).await.item.quantity, 1);
        hub.publish(event(ChangeKind::Create, 3)).await.unwrap();
        assert_eq!(next(&mut slow).await.item.quantity, 3);
    }

    #[tokio::test]
    async fn loop_stops_when_last_handle_is_dropped() {
        let (hub, join) = Hub::spawn(HubConfig::default());
        let mut sub = hub.subscribe().await.unwrap();
        drop(hub);

        tokio::time::timeout(Duration::from_secs(2), join)
            .await
            .expect("loop did not stop")
            .unwrap();
        assert!(closed(&mut sub).await);
    }

    #[tokio::test]
    async fn concurrent_publishers_never_lose_or_duplicate_events() {
        let (hub, _loop) = Hub::spawn(HubConfig {
            subscriber_buffer: 1_024,
            ..HubConfig::default()
        });
        let mut sub = hub.subscribe().await.unwrap();

        let publishers: Vec<_> = (0..8i64)
            .map(|p| {
                let hub = hub.clone();
                tokio::spawn(async move {
                    for n in 0..50 {
                        hub.publish(event(ChangeKind::Update, p * 100 + n)).await.unwrap();
                    }
                })
            })
            .collect();
        for p in publishers {
            p.await.unwrap();
        }

        let mut seen = std::collections::HashSet::new();
        for _ in 0..400 {
            assert!(seen.insert(next(&mut sub).await.item.quantity));
        }
        assert!(sub.try_recv().is_err());
    }

    #[tokio::test]
    async fn reserved_slot_publishes_without_waiting() {
        let (hub, _loop) = Hub::spawn(HubConfig {
            queue_capacity: 1,
            ..HubConfig::default()
        });
        let mut sub = hub.subscribe().await.unwrap();
        assert_eq!(hub.subscriber_count().await.unwrap(), 1);

        let permit = hub.reserve().await.unwrap();
        permit.publish(event(ChangeKind::Create, 1));
        assert_eq!(next(&mut sub).await.item.quantity, 1);

        // An unused permit returns its slot.
        drop(hub.reserve().await.unwrap());
        hub.publish(event(ChangeKind::Create, 2)).await.unwrap();
        assert_eq!(next(&mut sub).await.item.quantity, 2);
    }

    #[tokio::test]
    async fn reserve_fails_once_the_loop_has_stopped() {
        let (hub, join) = Hub::spawn(HubConfig::default());
        join.abort();
        let _ = join.await;

        assert_eq!(hub.reserve().await.unwrap_err(), HubError::Closed);
    }
}
