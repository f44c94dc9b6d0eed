//! Change events and the broadcast hub that fans them out to live subscribers.

pub mod change;
pub mod hub;
pub mod subscriber;

pub use change::{ChangeEvent, ChangeKind};
pub use hub::{Hub, HubConfig, HubError, PublishPermit};
pub use subscriber::{OverflowPolicy, Subscriber, Subscription};
