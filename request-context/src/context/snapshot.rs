//! Immutable point-in-time copies of a context store.

use super::ContextData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An immutable snapshot of a context's contents.
///
/// A snapshot owns its own copy of the data, so later mutations of the live
/// context never show through. Restoring replaces the live contents with
/// exactly these entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    entries: ContextData,
    taken_at: DateTime<Utc>,
}

impl ContextSnapshot {
    pub(crate) fn new(entries: ContextData) -> Self {
        Self {
            entries,
            taken_at: Utc::now(),
        }
    }

    /// Gets a value captured in the snapshot.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Checks if the snapshot captured `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns when the snapshot was taken.
    #[must_use]
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Returns the number of captured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the captured keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns a copy of the captured data.
    #[must_use]
    pub fn to_dict(&self) -> ContextData {
        self.entries.clone()
    }
}
