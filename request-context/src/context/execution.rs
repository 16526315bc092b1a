//! The per-unit-of-work context and its identity.

use super::{ContextData, ContextKey, ContextSnapshot, SetPolicy, Store};
use crate::errors::{ContextError, MissingKeyError, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static CONTEXT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a context, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        Self(CONTEXT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// The key/value context of one unit of work.
///
/// A context is only ever created by [`run`](crate::run) or
/// [`run_sync`](crate::run_sync) and is ambient for the dynamic extent of the
/// function given to it. The lock only sees contention when a unit hands its
/// context to tasks it spawned through [`crate::propagation::spawn`].
pub struct Context {
    id: ContextId,
    created_at: DateTime<Utc>,
    store: RwLock<Store>,
}

impl Context {
    pub(crate) fn create<I, K>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut data: ContextData = initial.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if data.remove("").is_some() {
            tracing::warn!("Dropped empty key from initial context data");
        }

        Self {
            id: ContextId::next(),
            created_at: Utc::now(),
            store: RwLock::new(Store::from_data(data)),
        }
    }

    /// Returns the context that is ambient for the calling unit of work.
    #[must_use]
    pub fn current() -> Option<Arc<Self>> {
        crate::propagation::current()
    }

    /// Returns the context id.
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Returns when the context was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Gets a typed value.
    ///
    /// Returns `Ok(None)` when the key is absent or holds null.
    pub fn get<T: DeserializeOwned>(&self, key: &ContextKey<T>) -> Result<Option<T>> {
        // Decoding runs user code, so it happens after the guard is released.
        match self.get_value(key.name()) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| ContextError::serialization(key.name(), &e)),
        }
    }

    /// Gets the raw stored value by name.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.store.read().get(name).cloned()
    }

    /// Sets a value, overwriting any existing one.
    pub fn set<T: Serialize>(&self, key: &ContextKey<T>, value: T) -> Result<()> {
        self.set_with_policy(key, value, SetPolicy::Overwrite)
    }

    /// Sets a value under the given collision policy.
    pub fn set_with_policy<T: Serialize>(
        &self,
        key: &ContextKey<T>,
        value: T,
        policy: SetPolicy,
    ) -> Result<()> {
        let value =
            serde_json::to_value(value).map_err(|e| ContextError::serialization(key.name(), &e))?;
        self.store.write().set(key.name(), value, policy)
    }

    /// Checks if the key was stored, even with a null value.
    #[must_use]
    pub fn has<T>(&self, key: &ContextKey<T>) -> bool {
        self.store.read().has(key.name())
    }

    /// Gets a typed value, failing if it is absent or null.
    pub fn require<T: DeserializeOwned>(&self, key: &ContextKey<T>) -> Result<T> {
        self.get(key)?
            .ok_or_else(|| MissingKeyError::new(key.name()).into())
    }

    /// Merges entries, overwriting existing ones.
    pub fn merge<I, K>(&self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.merge_with_policy(data, SetPolicy::Overwrite)
    }

    /// Merges entries under the given collision policy.
    ///
    /// Under `Deny` nothing is written if any key collides.
    pub fn merge_with_policy<I, K>(&self, data: I, policy: SetPolicy) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        // The payload may read this context while it is iterated.
        let entries: Vec<(String, Value)> =
            data.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.store.write().merge(entries, policy)
    }

    /// Takes an independent copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> ContextSnapshot {
        self.store.read().snapshot()
    }

    /// Replaces the contents with exactly those of `snapshot`.
    pub fn restore(&self, snapshot: &ContextSnapshot) {
        let mut store = self.store.write();
        tracing::trace!(
            context_id = %self.id,
            before = store.len(),
            after = snapshot.len(),
            "Restoring context snapshot"
        );
        store.restore(snapshot);
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    /// Returns true if the context holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.store.read().keys()
    }

    /// Returns a copy of all data.
    #[must_use]
    pub fn to_dict(&self) -> ContextData {
        self.store.read().to_dict()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("keys", &self.keys())
            .finish()
    }
}
