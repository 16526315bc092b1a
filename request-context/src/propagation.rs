//! Task-local propagation of the ambient context.
//!
//! The ambient context lives in a `tokio` task-local slot. An async scope
//! swaps it in on every poll of the wrapped future and swaps it back out
//! afterwards, so the binding follows the future across suspension points
//! and across worker threads, and never bleeds into futures or tasks polled
//! in between. A sync scope does the same for a plain closure on any thread.
//!
//! `tokio::spawn` starts tasks with an empty slot. Work that belongs to the
//! current unit but runs on its own task goes through [`spawn`] or
//! [`in_current_context`], which only ever carry the context that is already
//! ambient.

use crate::context::Context;
use crate::errors::{ContextNotActiveError, Result};
use futures::future::Either;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

tokio::task_local! {
    static CURRENT: Arc<Context>;
}

/// Returns the ambient context, if any.
#[must_use]
pub fn current() -> Option<Arc<Context>> {
    CURRENT.try_with(Arc::clone).ok()
}

/// Returns true if a context is ambient.
#[must_use]
pub fn is_active() -> bool {
    CURRENT.try_with(|_| ()).is_ok()
}

/// Runs `f` against the ambient context without cloning its handle.
pub(crate) fn with_current<R>(f: impl FnOnce(&Context) -> R) -> Result<R> {
    CURRENT
        .try_with(|ctx| f(ctx))
        .map_err(|_| ContextNotActiveError::new().into())
}

pub(crate) async fn scope<F: Future>(context: Arc<Context>, fut: F) -> F::Output {
    CURRENT.scope(context, fut).await
}

pub(crate) fn sync_scope<F, R>(context: Arc<Context>, f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT.sync_scope(context, f)
}

/// Binds `fut` to the context that is ambient right now.
///
/// The returned future sees that context whenever it is polled, wherever it
/// is polled. With no ambient context, `fut` is returned unbound.
pub fn in_current_context<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    match current() {
        Some(context) => Either::Left(CURRENT.scope(context, fut)),
        None => Either::Right(fut),
    }
}

/// Spawns `fut` on the tokio runtime as a continuation of the current unit.
///
/// # Panics
///
/// Panics if called outside a tokio runtime, like `tokio::spawn`.
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(in_current_context(fut))
}

/// Runs blocking work on tokio's blocking pool as a continuation of the
/// current unit.
///
/// # Panics
///
/// Panics if called outside a tokio runtime, like `tokio::task::spawn_blocking`.
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let context = current();
    tokio::task::spawn_blocking(move || match context {
        Some(context) => CURRENT.sync_scope(context, f),
        None => f(),
    })
}
