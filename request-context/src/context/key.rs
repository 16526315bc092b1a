//! Typed keys for context lookups.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A typed handle naming one context attribute.
///
/// Identity is the name alone: two keys built from the same name address the
/// same slot. `T` only types the call site and has no runtime representation.
pub struct ContextKey<T> {
    name: Cow<'static, str>,
    _type: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Creates a key from a static name, usable in `const` items.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _type: PhantomData,
        }
    }

    /// Creates a key from a runtime name.
    #[must_use]
    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _type: PhantomData,
        }
    }

    /// Returns the key name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> PartialEq for ContextKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for ContextKey<T> {}

impl<T> Hash for ContextKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

impl<T> fmt::Display for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<T> AsRef<str> for ContextKey<T> {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: ContextKey<String> = ContextKey::new("user");

    #[test]
    fn test_same_name_same_key() {
        let dynamic: ContextKey<String> = ContextKey::from_name(String::from("user"));
        assert_eq!(USER, dynamic);
        assert_eq!(USER.name(), "user");
    }

    #[test]
    fn test_display_and_debug() {
        assert_eq!(USER.to_string(), "user");
        assert_eq!(format!("{USER:?}"), "ContextKey(\"user\")");
    }

    #[test]
    fn test_key_is_send_sync_for_any_type() {
        fn assert_send_sync<K: Send + Sync>() {}
        assert_send_sync::<ContextKey<std::rc::Rc<u8>>>();
    }
}
