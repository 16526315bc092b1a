//! Tracing integration for request contexts.
//!
//! Every `run` opens a `request_context.run` span described by
//! [`RunSpanAttributes`], so events logged inside a unit of work carry its
//! context id and request id.

use crate::config::LoggingConfig;
use crate::context::{Context, ContextId};
use crate::errors::ConfigError;
use crate::keys::REQUEST_ID;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

/// Span attributes describing one context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpanAttributes {
    /// The context id.
    pub context_id: ContextId,
    /// The request id, if the context holds one.
    pub request_id: Option<String>,
    /// Number of keys at the time the attributes were taken.
    pub keys: usize,
}

impl RunSpanAttributes {
    /// Builds attributes from a context.
    #[must_use]
    pub fn from_context(context: &Context) -> Self {
        Self {
            context_id: context.id(),
            request_id: context.get(&REQUEST_ID).ok().flatten(),
            keys: context.len(),
        }
    }

    /// Converts to OpenTelemetry-style attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("context.id".to_string(), self.context_id.to_string());
        attrs.insert("context.keys".to_string(), self.keys.to_string());
        if let Some(ref v) = self.request_id {
            attrs.insert("request.id".to_string(), v.clone());
        }

        attrs
    }
}

/// Installs a global `tracing` subscriber configured by `config`.
///
/// # Errors
///
/// Returns `ConfigError` if the filter directive is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| ConfigError::new("filter", e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| ConfigError::new("subscriber", e.to_string()))
}
