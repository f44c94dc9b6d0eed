//! Subscriber handles and their bounded outbound queues.
//!
//! Each connection gets a queue of its own. The hub side ([`Subscriber`]) only ever
//! `try_send`s into it, so one slow connection cannot stall delivery to the others.
//! The connection side ([`Subscription`]) drains it into the transport.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use stockhub_core::{DomainError, SubscriberId};

use crate::change::ChangeEvent;

/// What the hub does when a subscriber's outbound queue is full.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Unregister the subscriber; its connection closes once the queue drains.
    #[default]
    Disconnect,
    /// Skip this event for that subscriber only and keep it registered.
    DropNewest,
}

impl core::str::FromStr for OverflowPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disconnect" => Ok(Self::Disconnect),
            "drop-newest" | "drop_newest" => Ok(Self::DropNewest),
            other => Err(DomainError::invalid_input(format!(
                "overflow policy must be one of: disconnect, drop-newest (got {other:?})"
            ))),
        }
    }
}

/// Why a subscriber was removed during delivery.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum DropReason {
    Overflow,
    Closed,
}

impl core::fmt::Display for DropReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DropReason::Overflow => f.write_str("outbound queue full"),
            DropReason::Closed => f.write_str("connection closed"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Delivery {
    Delivered,
    Skipped,
    Dropped(DropReason),
}

/// Hub-side handle to one live connection.
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    outbound: mpsc::Sender<Arc<ChangeEvent>>,
}

impl Subscriber {
    /// Create a connected pair sharing a queue of `buffer` events (at least one).
    pub fn pair(buffer: usize) -> (Subscriber, Subscription) {
        let id = SubscriberId::new();
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (
            Subscriber { id, outbound: tx },
            Subscription { id, inbound: rx },
        )
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub(crate) fn offer(&self, event: &Arc<ChangeEvent>, policy: OverflowPolicy) -> Delivery {
        match self.outbound.try_send(event.clone()) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => match policy {
                OverflowPolicy::Disconnect => Delivery::Dropped(DropReason::Overflow),
                OverflowPolicy::DropNewest => Delivery::Skipped,
            },
            Err(TrySendError::Closed(_)) => Delivery::Dropped(DropReason::Closed),
        }
    }
}

/// Connection-side end of a subscriber queue.
///
/// Dropping it marks the subscriber dead; the hub unregisters it on the next
/// delivery attempt.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    inbound: mpsc::Receiver<Arc<ChangeEvent>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event, or `None` once the hub has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<Arc<ChangeEvent>> {
        self.inbound.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Arc<ChangeEvent>, TryRecvError> {
        self.inbound.try_recv()
    }

    pub fn into_receiver(self) -> mpsc::Receiver<Arc<ChangeEvent>> {
        self.inbound
    }
}
