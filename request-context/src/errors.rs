//! Error types for request context operations.
//!
//! None of these errors are retried or recovered internally. They signal
//! caller misuse or caller-requested strictness and are returned to the
//! collaborator, which decides how to surface them.

use std::collections::HashMap;
use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T, E = ContextError> = std::result::Result<T, E>;

/// The main error type for request context operations.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// A read or write was attempted with no ambient context.
    #[error("{0}")]
    NotActive(#[from] ContextNotActiveError),

    /// A `Deny` mutation targeted an existing key.
    #[error("{0}")]
    KeyCollision(#[from] KeyCollisionError),

    /// A required key was absent.
    #[error("{0}")]
    MissingKey(#[from] MissingKeyError),

    /// A key name was rejected.
    #[error("{0}")]
    InvalidKey(#[from] InvalidKeyError),

    /// A stored value could not be encoded or decoded as the key's type.
    #[error("Serialization error for key '{key}': {message}")]
    Serialization {
        /// The key being accessed.
        key: String,
        /// The underlying serde message.
        message: String,
    },

    /// Contexts leaked between units of work.
    #[error("{0}")]
    Leak(#[from] ContextLeakError),

    /// Configuration could not be loaded or applied.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl ContextError {
    /// Creates a serialization error from a serde_json failure.
    #[must_use]
    pub fn serialization(key: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotActive(_) => "CONTEXT_NOT_ACTIVE",
            Self::KeyCollision(_) => "CONTEXT_KEY_COLLISION",
            Self::MissingKey(_) => "CONTEXT_MISSING_KEY",
            Self::InvalidKey(_) => "CONTEXT_INVALID_KEY",
            Self::Serialization { .. } => "CONTEXT_SERIALIZATION",
            Self::Leak(_) => "CONTEXT_LEAK",
            Self::Config(_) => "CONTEXT_CONFIG",
        }
    }

    /// Returns the key involved in the error, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::KeyCollision(e) => Some(&e.key),
            Self::MissingKey(e) => Some(&e.key),
            Self::InvalidKey(e) => Some(&e.key),
            Self::Serialization { key, .. } => Some(key),
            Self::Config(e) => Some(&e.key),
            Self::NotActive(_) | Self::Leak(_) => None,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        if let Some(key) = self.key() {
            map.insert("key".to_string(), serde_json::json!(key));
        }
        map
    }
}

/// Error raised when no context is active on the current logical path.
#[derive(Debug, Clone, Default, Error)]
#[error("No active context. Use run() to create a context before accessing it.")]
pub struct ContextNotActiveError;

impl ContextNotActiveError {
    /// Creates a new not-active error.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Error raised when a `Deny` policy finds the key already present.
#[derive(Debug, Clone, Error)]
#[error("Key '{key}' already exists in the context and policy is set to 'deny'")]
pub struct KeyCollisionError {
    /// The conflicting key.
    pub key: String,
}

impl KeyCollisionError {
    /// Creates a new key collision error.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Error raised when a required key is missing.
#[derive(Debug, Clone, Error)]
#[error("Required key '{key}' is missing from the context")]
pub struct MissingKeyError {
    /// The missing key.
    pub key: String,
}

impl MissingKeyError {
    /// Creates a new missing key error.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Error raised when a key name cannot be stored.
#[derive(Debug, Clone, Error)]
#[error("Invalid context key '{key}': {reason}")]
pub struct InvalidKeyError {
    /// The rejected key.
    pub key: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InvalidKeyError {
    /// Creates a new invalid key error.
    #[must_use]
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Error for an empty key name.
    #[must_use]
    pub fn empty() -> Self {
        Self::new("", "key name must not be empty")
    }
}

/// Error raised when contexts are observed leaking between units of work.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ContextLeakError {
    /// Description of the leak.
    pub message: String,
}

impl ContextLeakError {
    /// Creates a new leak error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error raised when a configuration value is invalid.
#[derive(Debug, Clone, Error)]
#[error("Invalid configuration for '{key}': {message}")]
pub struct ConfigError {
    /// The configuration key.
    pub key: String,
    /// What was wrong with it.
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: ContextError = ContextNotActiveError::new().into();
        assert_eq!(err.code(), "CONTEXT_NOT_ACTIVE");
        assert!(err.key().is_none());

        let err: ContextError = KeyCollisionError::new("requestId").into();
        assert_eq!(err.code(), "CONTEXT_KEY_COLLISION");
        assert_eq!(err.key(), Some("requestId"));
    }

    #[test]
    fn test_collision_message_names_key() {
        let err = KeyCollisionError::new("user");
        assert!(err.to_string().contains("'user'"));
        assert!(err.to_string().contains("deny"));
    }

    #[test]
    fn test_missing_key_to_dict() {
        let err: ContextError = MissingKeyError::new("tenant").into();
        let dict = err.to_dict();

        assert_eq!(dict.get("code").unwrap(), "CONTEXT_MISSING_KEY");
        assert_eq!(dict.get("key").unwrap(), "tenant");
        assert!(dict.contains_key("message"));
    }

    #[test]
    fn test_serialization_error() {
        let serde_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = ContextError::serialization("count", &serde_err);
        assert_eq!(err.code(), "CONTEXT_SERIALIZATION");
        assert_eq!(err.key(), Some("count"));
    }
}
