//! Module-level API over the ambient context.
//!
//! [`run`] and [`run_sync`] are the only ways to create a context and make
//! it ambient. Every other function resolves the ambient context first and
//! fails with `ContextNotActive` when there is none.

use crate::context::{Context, ContextKey, ContextSnapshot, SetPolicy};
use crate::errors::Result;
use crate::observability::RunSpanAttributes;
use crate::propagation;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

fn run_span(context: &Context) -> tracing::Span {
    let attrs = RunSpanAttributes::from_context(context);
    tracing::debug_span!(
        "request_context.run",
        context_id = %attrs.context_id,
        request_id = attrs.request_id.as_deref(),
        keys = attrs.keys,
    )
}

/// Runs the future produced by `f` inside a new context seeded with
/// `initial`.
///
/// The context is ambient for `f` and everything it awaits, and is discarded
/// when the future completes or is dropped. A nested `run` starts from its
/// own `initial` only; the outer context is ambient again once it finishes.
pub async fn run<I, K, F, Fut>(initial: I, f: F) -> Fut::Output
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
    F: FnOnce() -> Fut,
    Fut: Future,
{
    let context = Arc::new(Context::create(initial));
    let span = run_span(&context);
    let id = context.id();

    propagation::scope(context, async move {
        tracing::trace!(context_id = %id, "Context entered");
        let output = f().await;
        tracing::trace!(context_id = %id, "Context exited");
        output
    })
    .instrument(span)
    .await
}

/// Runs `f` inside a new context seeded with `initial`.
///
/// The synchronous counterpart of [`run`], usable on any thread.
pub fn run_sync<I, K, F, R>(initial: I, f: F) -> R
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
    F: FnOnce() -> R,
{
    let context = Arc::new(Context::create(initial));
    let span = run_span(&context);
    let _entered = span.enter();
    let id = context.id();

    propagation::sync_scope(context, || {
        tracing::trace!(context_id = %id, "Context entered");
        let output = f();
        tracing::trace!(context_id = %id, "Context exited");
        output
    })
}

/// Returns the ambient context, if any.
#[must_use]
pub fn current() -> Option<Arc<Context>> {
    propagation::current()
}

/// Gets a typed value from the ambient context.
pub fn get<T: DeserializeOwned>(key: &ContextKey<T>) -> Result<Option<T>> {
    propagation::with_current(|ctx| ctx.get(key))?
}

/// Gets a raw value from the ambient context.
pub fn get_value(name: &str) -> Result<Option<Value>> {
    propagation::with_current(|ctx| ctx.get_value(name))
}

/// Sets a value in the ambient context, overwriting any existing one.
pub fn set<T: Serialize>(key: &ContextKey<T>, value: T) -> Result<()> {
    propagation::with_current(|ctx| ctx.set(key, value))?
}

/// Sets a value in the ambient context under `policy`.
pub fn set_with_policy<T: Serialize>(key: &ContextKey<T>, value: T, policy: SetPolicy) -> Result<()> {
    propagation::with_current(|ctx| ctx.set_with_policy(key, value, policy))?
}

/// Checks if the ambient context holds `key`.
pub fn has<T>(key: &ContextKey<T>) -> Result<bool> {
    propagation::with_current(|ctx| ctx.has(key))
}

/// Gets a typed value from the ambient context, failing if absent.
pub fn require<T: DeserializeOwned>(key: &ContextKey<T>) -> Result<T> {
    propagation::with_current(|ctx| ctx.require(key))?
}

/// Merges entries into the ambient context, overwriting existing ones.
pub fn merge<I, K>(data: I) -> Result<()>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    propagation::with_current(|ctx| ctx.merge(data))?
}

/// Merges entries into the ambient context under `policy`.
pub fn merge_with_policy<I, K>(data: I, policy: SetPolicy) -> Result<()>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    propagation::with_current(|ctx| ctx.merge_with_policy(data, policy))?
}

/// Snapshots the ambient context.
pub fn snapshot() -> Result<ContextSnapshot> {
    propagation::with_current(Context::snapshot)
}

/// Restores the ambient context from `snapshot`.
pub fn restore(snapshot: &ContextSnapshot) -> Result<()> {
    propagation::with_current(|ctx| ctx.restore(snapshot))
}
