//! # Request Context
//!
//! Task-scoped key/value context for async Rust.
//!
//! A unit of work (typically one inbound request) gets its own context for
//! the dynamic extent of a single [`run`] call. Code anywhere below that call,
//! across `.await` points and nested function calls, reads and writes the
//! context without it being passed as an argument:
//!
//! - **Isolation**: concurrent units never observe each other's context,
//!   whether they are interleaved on one task or spread over worker threads
//! - **Nesting**: a nested `run` starts empty and its writes are discarded
//!   when it ends
//! - **Collision policies**: writes can overwrite, ignore, or deny existing keys
//! - **Snapshots**: capture and restore the whole context
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use request_context::prelude::*;
//!
//! const USER: ContextKey<String> = ContextKey::new("user");
//!
//! let seed = RequestSeed::new().with_request_id(header_value);
//! let response = run(seed.into_context_data(&SeedConfig::default()), || async {
//!     set(&USER, "alice".to_string())?;
//!     handle().await
//! })
//! .await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod api;
pub mod config;
pub mod context;
pub mod errors;
pub mod keys;
pub mod observability;
pub mod propagation;
pub mod seed;
pub mod testing;

pub use api::{
    current, get, get_value, has, merge, merge_with_policy, require, restore, run, run_sync, set,
    set_with_policy, snapshot,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::{
        current, get, get_value, has, merge, merge_with_policy, require, restore, run, run_sync,
        set, set_with_policy, snapshot,
    };
    pub use crate::config::{Config, ContextMode, IdStrategy, LoggingConfig, SeedConfig};
    pub use crate::context::{
        Context, ContextData, ContextId, ContextKey, ContextSnapshot, SetPolicy,
    };
    pub use crate::errors::{ContextError, Result};
    pub use crate::keys::{IP, METHOD, REQUEST_ID, ROUTE};
    pub use crate::propagation::{in_current_context, spawn, spawn_blocking};
    pub use crate::seed::{IdGenerator, RequestSeed};
}
