//! Shared building blocks for the stockhub crates.
//!
//! This crate contains **pure** primitives (no IO, no async, no transport).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{StockItemId, SubscriberId};
