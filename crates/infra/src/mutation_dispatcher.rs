//! Mutation pipeline (producer-facing contract).
//!
//! ```text
//! request body + verb
//!   ↓
//! 1. Decode into a StockItem-shaped record   (InvalidInput → abort, no side effects)
//!   ↓
//! 2. Validate for the verb                    (missing id / unknown verb → abort)
//!   ↓
//! 3. Reserve a slot in the hub queue          (HubClosed → abort, no side effects)
//!   ↓
//! 4. Store mutation + ChangeEvent hand-off    (synchronous, no await in between)
//!   ↓
//! 5. Return the resulting item
//! ```
//!
//! Step 3 is the only suspension point. A request dropped while waiting there has
//! changed nothing; once the store is written, its event is already queued.

use thiserror::Error;
use tracing::info;

use stockhub_core::DomainError;
use stockhub_events::{ChangeEvent, ChangeKind, Hub, HubError};
use stockhub_inventory::{StockItem, StockItemDraft, StockItemRecord, StockStore};

/// Requested operation on the mutation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationVerb {
    Create,
    Update,
    Delete,
    /// Anything else; rejected after decoding with `UnsupportedOperation`.
    Other(String),
}

impl MutationVerb {
    /// Map an HTTP method name (`POST`/`PUT`/`DELETE`) to a verb.
    pub fn from_http_method(method: &str) -> Self {
        match method {
            "POST" => Self::Create,
            "PUT" => Self::Update,
            "DELETE" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// Invalid input or unsupported operation; nothing was mutated or published.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// The hub is gone (shutdown in progress); nothing was mutated.
    #[error(transparent)]
    Hub(#[from] HubError),
}

/// Store + hub, sequenced.
#[derive(Debug)]
pub struct MutationDispatcher<S> {
    store: S,
    hub: Hub,
}

impl<S> MutationDispatcher<S> {
    pub fn new(store: S, hub: Hub) -> Self {
        Self { store, hub }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }
}

impl<S> MutationDispatcher<S>
where
    S: StockStore,
{
    /// Read-all: a point-in-time copy of the inventory.
    pub fn list(&self) -> Vec<StockItem> {
        self.store.snapshot()
    }

    /// Run one mutation request through the pipeline.
    pub async fn execute(
        &self,
        verb: &MutationVerb,
        body: &[u8],
    ) -> Result<StockItem, MutationError> {
        // 1) Decode
        let record = StockItemRecord::decode(body)?;

        // 2) Validate
        let mutation = Mutation::plan(verb, record)?;

        // 3) Reserve
        let permit = self.hub.reserve().await?;

        // 4) Mutate + publish (store lock released before the hand-off)
        let kind = mutation.kind();
        let item = self.apply(mutation);
        permit.publish(ChangeEvent::new(kind, item.clone()));

        // 5) Respond
        Ok(item)
    }

    fn apply(&self, mutation: Mutation) -> StockItem {
        match mutation {
            Mutation::Create(draft) => {
                let item = self.store.create(draft);
                info!(item_id = %item.id, name = %item.name, "stock item created");
                item
            }
            Mutation::Update(item) => {
                let item = self.store.update(item);
                info!(item_id = %item.id, name = %item.name, "stock item updated");
                item
            }
            Mutation::Delete { echo } => {
                let removed = self.store.delete(&echo.id);
                info!(item_id = %echo.id, existed = removed.is_some(), "stock item deleted");
                // Absent ids still broadcast, echoing the request so viewers can reconcile.
                removed.unwrap_or(echo)
            }
        }
    }
}

/// A validated request, ready to apply without further checks.
#[derive(Debug)]
enum Mutation {
    Create(StockItemDraft),
    Update(StockItem),
    /// `echo` is the request's item, returned when nothing was stored under its id.
    Delete { echo: StockItem },
}

impl Mutation {
    fn plan(verb: &MutationVerb, record: StockItemRecord) -> Result<Self, DomainError> {
        match verb {
            MutationVerb::Create => Ok(Self::Create(record.draft())),
            MutationVerb::Update => Ok(Self::Update(record.into_item()?)),
            MutationVerb::Delete => Ok(Self::Delete {
                echo: record.into_item()?,
            }),
            MutationVerb::Other(name) => {
                Err(DomainError::unsupported(format!("method {name} is not allowed")))
            }
        }
    }

    fn kind(&self) -> ChangeKind {
        match self {
            Self::Create(_) => ChangeKind::Create,
            Self::Update(_) => ChangeKind::Update,
            Self::Delete { .. } => ChangeKind::Delete,
        }
    }
}
