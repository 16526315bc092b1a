//! Context management for units of work.
//!
//! This module provides:
//! - Typed keys and collision policies
//! - The key/value store owned by each context
//! - Immutable snapshots for capturing and restoring state

mod execution;
mod key;
mod policy;
mod snapshot;
mod store;

pub use execution::{Context, ContextId};
pub use key::ContextKey;
pub use policy::SetPolicy;
pub use snapshot::ContextSnapshot;
pub use store::{ContextData, Store};
