//! The key/value store owned by each context.

use super::{ContextSnapshot, SetPolicy};
use crate::errors::{ContextError, InvalidKeyError, KeyCollisionError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Flat string-keyed payload used to seed and merge into a store.
pub type ContextData = HashMap<String, Value>;

/// A mutable mapping from key name to value with policy-governed writes.
///
/// The store has no concurrency semantics of its own. Membership is exactly
/// the set of names written into it, including names holding `Value::Null`.
#[derive(Debug, Clone, Default)]
pub struct Store {
    data: ContextData,
}

impl Store {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from existing data.
    #[must_use]
    pub fn from_data(data: ContextData) -> Self {
        Self { data }
    }

    /// Gets a value from the store.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Checks if a key was stored, even with a null value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Sets a value according to `policy`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for an empty key and `KeyCollision` when the
    /// policy is `Deny` and the key already exists.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: Value,
        policy: SetPolicy,
    ) -> Result<(), ContextError> {
        let key = key.into();
        if key.is_empty() {
            return Err(InvalidKeyError::empty().into());
        }

        if self.data.contains_key(&key) {
            match policy {
                SetPolicy::Deny => {
                    tracing::debug!(key = %key, "Context key collision");
                    return Err(KeyCollisionError::new(key).into());
                }
                SetPolicy::Ignore => return Ok(()),
                SetPolicy::Overwrite => {}
            }
        }

        self.data.insert(key, value);
        Ok(())
    }

    /// Merges every entry of `data` according to `policy`.
    ///
    /// All keys are validated before anything is written, so a failing merge
    /// leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if any key is empty, or `KeyCollision` for the
    /// first existing key found under `Deny`.
    pub fn merge<I, K>(&mut self, data: I, policy: SetPolicy) -> Result<(), ContextError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries: Vec<(String, Value)> =
            data.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let mut seen = HashSet::with_capacity(entries.len());
        for (key, _) in &entries {
            if key.is_empty() {
                return Err(InvalidKeyError::empty().into());
            }
            let repeated = !seen.insert(key.as_str());
            if policy == SetPolicy::Deny && (repeated || self.data.contains_key(key)) {
                tracing::debug!(key = %key, "Context key collision during merge");
                return Err(KeyCollisionError::new(key.clone()).into());
            }
        }

        for (key, value) in entries {
            match policy {
                SetPolicy::Ignore => {
                    self.data.entry(key).or_insert(value);
                }
                SetPolicy::Overwrite | SetPolicy::Deny => {
                    self.data.insert(key, value);
                }
            }
        }

        Ok(())
    }

    /// Takes an independent copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot::new(self.data.clone())
    }

    /// Replaces the contents with exactly those of `snapshot`.
    pub fn restore(&mut self, snapshot: &ContextSnapshot) {
        self.data = snapshot.to_dict();
    }

    /// Replaces the contents with `data`.
    pub fn reset(&mut self, data: ContextData) {
        self.data = data;
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.data = ContextData::new();
    }

    /// Returns a copy of all data.
    #[must_use]
    pub fn to_dict(&self) -> ContextData {
        self.data.clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store_with(key: &str, value: Value) -> Store {
        let mut store = Store::new();
        store.set(key, value, SetPolicy::Overwrite).unwrap();
        store
    }

    #[test]
    fn test_set_and_get() {
        let store = store_with("key", json!("value"));

        assert_eq!(store.get("key"), Some(&json!("value")));
        assert!(store.has("key"));
        assert!(!store.has("other"));
        assert_eq!(store.get("other"), None);
    }

    #[test]
    fn test_no_inherited_entries() {
        let store = Store::new();
        for name in ["toString", "constructor", "__proto__", "hasOwnProperty"] {
            assert!(!store.has(name));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_null_is_present() {
        let store = store_with("maybe", Value::Null);
        assert!(store.has("maybe"));
        assert_eq!(store.get("maybe"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut store = Store::new();
        let err = store.set("", json!(1), SetPolicy::Overwrite).unwrap_err();
        assert!(matches!(err, ContextError::InvalidKey(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_policies() {
        let cases = [
            (SetPolicy::Overwrite, true, json!(2)),
            (SetPolicy::Deny, false, json!(1)),
            (SetPolicy::Ignore, true, json!(1)),
        ];

        for (policy, succeeds, expected) in cases {
            let mut store = store_with("a", json!(1));
            let result = store.set("a", json!(2), policy);

            assert_eq!(result.is_ok(), succeeds, "policy {policy}");
            assert_eq!(store.get("a"), Some(&expected), "policy {policy}");
        }
    }

    #[test]
    fn test_policies_on_fresh_key_always_write() {
        for policy in [SetPolicy::Overwrite, SetPolicy::Deny, SetPolicy::Ignore] {
            let mut store = Store::new();
            store.set("a", json!(1), policy).unwrap();
            assert_eq!(store.get("a"), Some(&json!(1)));
        }
    }

    #[test]
    fn test_merge_policies() {
        let cases = [
            (SetPolicy::Overwrite, true, json!(2)),
            (SetPolicy::Deny, false, json!(1)),
            (SetPolicy::Ignore, true, json!(1)),
        ];

        for (policy, succeeds, expected) in cases {
            let mut store = store_with("a", json!(1));
            let result = store.merge([("a", json!(2)), ("b", json!(3))], policy);

            assert_eq!(result.is_ok(), succeeds, "policy {policy}");
            assert_eq!(store.get("a"), Some(&expected), "policy {policy}");
        }
    }

    #[test]
    fn test_deny_merge_is_all_or_nothing() {
        let mut store = store_with("taken", json!(1));
        let data = [("fresh1", json!(1)), ("taken", json!(2)), ("fresh2", json!(3))];

        let err = store.merge(data, SetPolicy::Deny).unwrap_err();

        assert!(matches!(err, ContextError::KeyCollision(ref e) if e.key == "taken"));
        assert_eq!(store.len(), 1);
        assert!(!store.has("fresh1"));
        assert!(!store.has("fresh2"));

        let repeated = [("dup", json!(1)), ("other", json!(2)), ("dup", json!(3))];
        let err = store.merge(repeated, SetPolicy::Deny).unwrap_err();

        assert!(matches!(err, ContextError::KeyCollision(ref e) if e.key == "dup"));
        assert_eq!(store.len(), 1);
        assert!(!store.has("dup"));
        assert!(!store.has("other"));
    }

    #[test]
    fn test_merge_rejects_empty_key_before_writing() {
        let mut store = Store::new();
        let result = store.merge([("ok", json!(1)), ("", json!(2))], SetPolicy::Overwrite);

        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut store = store_with("a", json!(1));
        let snapshot = store.snapshot();

        store.set("a", json!(2), SetPolicy::Overwrite).unwrap();
        store.set("b", json!(3), SetPolicy::Overwrite).unwrap();

        assert_eq!(snapshot.get("a"), Some(&json!(1)));
        assert!(!snapshot.contains("b"));
    }

    #[test]
    fn test_restore_removes_added_keys() {
        let mut store = store_with("a", json!(1));
        let snapshot = store.snapshot();

        store.set("a", json!(10), SetPolicy::Overwrite).unwrap();
        store.set("added", json!(true), SetPolicy::Overwrite).unwrap();
        store.restore(&snapshot);

        assert_eq!(store.to_dict(), snapshot.to_dict());
        assert!(!store.has("added"));
    }

    #[test]
    fn test_reset_and_clear() {
        let mut store = store_with("a", json!(1));

        store.reset(ContextData::from([("b".to_string(), json!(2))]));
        assert_eq!(store.keys(), vec!["b".to_string()]);

        store.clear();
        assert!(store.is_empty());
    }
}
