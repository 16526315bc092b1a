//! Building initial context data for an inbound unit of work.
//!
//! Transport adapters extract whatever they have (a correlation header, the
//! matched route, the verb, the peer address) into a [`RequestSeed`] and turn
//! it into the payload for [`run`](crate::run). A missing request id is
//! generated.

use crate::config::{ContextMode, IdStrategy, SeedConfig};
use crate::context::ContextData;
use serde_json::Value;
use uuid::Uuid;

/// Source of fresh request ids.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    /// Generates a new id.
    fn generate(&self) -> String;
}

impl IdGenerator for IdStrategy {
    fn generate(&self) -> String {
        match self {
            Self::UuidV4 => Uuid::new_v4().to_string(),
            Self::UuidV7 => Uuid::now_v7().to_string(),
        }
    }
}

/// Generates a request id with the default strategy.
#[must_use]
pub fn generate_request_id() -> String {
    IdStrategy::default().generate()
}

/// Transport-independent facts about an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSeed {
    /// Incoming correlation id, if the caller supplied one.
    pub request_id: Option<String>,
    /// Route or operation name.
    pub route: Option<String>,
    /// Method or verb.
    pub method: Option<String>,
    /// Client address.
    pub ip: Option<String>,
}

impl RequestSeed {
    /// Creates an empty seed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the incoming request id. Blank ids are treated as missing.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.request_id = if id.trim().is_empty() { None } else { Some(id) };
        self
    }

    /// Sets the route.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the client address.
    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Converts into initial context data using the configured id strategy.
    #[must_use]
    pub fn into_context_data(self, config: &SeedConfig) -> ContextData {
        self.into_context_data_with(config, &config.id_strategy)
    }

    /// Converts into initial context data using `generator` for missing ids.
    #[must_use]
    pub fn into_context_data_with(
        self,
        config: &SeedConfig,
        generator: &dyn IdGenerator,
    ) -> ContextData {
        let mut data = ContextData::new();

        let request_id = self
            .request_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| {
                let id = generator.generate();
                tracing::trace!(request_id = %id, "Generated request id");
                id
            });
        data.insert(config.request_id_key.clone(), Value::String(request_id));

        if config.mode == ContextMode::Standard {
            if let Some(route) = self.route {
                data.insert(config.route_key.clone(), Value::String(route));
            }
            if let Some(method) = self.method {
                data.insert(config.method_key.clone(), Value::String(method));
            }
        }

        if let (Some(key), Some(ip)) = (&config.ip_key, self.ip) {
            data.insert(key.clone(), Value::String(ip));
        }

        data
    }
}
