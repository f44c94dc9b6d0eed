//! Application-level orchestration: store mutation followed by hub publication.

pub mod mutation_dispatcher;

pub use mutation_dispatcher::{MutationDispatcher, MutationError, MutationVerb};
