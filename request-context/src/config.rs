//! Configuration for context seeding and logging.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which well-known entries a seeded context records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Only the request id.
    #[default]
    Minimal,
    /// Request id, route and method.
    Standard,
}

impl FromStr for ContextMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "standard" => Ok(Self::Standard),
            other => Err(ConfigError::new("mode", format!("unknown mode '{other}'"))),
        }
    }
}

/// How missing request ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Random UUID v4.
    #[default]
    UuidV4,
    /// Time-ordered UUID v7.
    UuidV7,
}

impl FromStr for IdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid_v4" | "uuidv4" | "v4" => Ok(Self::UuidV4),
            "uuid_v7" | "uuidv7" | "v7" => Ok(Self::UuidV7),
            other => Err(ConfigError::new(
                "id_strategy",
                format!("unknown id strategy '{other}'"),
            )),
        }
    }
}

/// Configuration for turning a request seed into initial context data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Key storing the request id.
    #[serde(default = "default_request_id_key")]
    pub request_id_key: String,
    /// Key storing the route.
    #[serde(default = "default_route_key")]
    pub route_key: String,
    /// Key storing the method.
    #[serde(default = "default_method_key")]
    pub method_key: String,
    /// Key storing the client address. Not recorded unless set.
    #[serde(default)]
    pub ip_key: Option<String>,
    /// Which entries to record.
    #[serde(default)]
    pub mode: ContextMode,
    /// How to generate missing request ids.
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

fn default_request_id_key() -> String {
    "requestId".to_string()
}

fn default_route_key() -> String {
    "route".to_string()
}

fn default_method_key() -> String {
    "method".to_string()
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            request_id_key: default_request_id_key(),
            route_key: default_route_key(),
            method_key: default_method_key(),
            ip_key: None,
            mode: ContextMode::default(),
            id_strategy: IdStrategy::default(),
        }
    }
}

impl SeedConfig {
    /// Creates a new seed configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request id key.
    #[must_use]
    pub fn with_request_id_key(mut self, key: impl Into<String>) -> Self {
        self.request_id_key = key.into();
        self
    }

    /// Sets the route key.
    #[must_use]
    pub fn with_route_key(mut self, key: impl Into<String>) -> Self {
        self.route_key = key.into();
        self
    }

    /// Sets the method key.
    #[must_use]
    pub fn with_method_key(mut self, key: impl Into<String>) -> Self {
        self.method_key = key.into();
        self
    }

    /// Enables recording the client address under `key`.
    #[must_use]
    pub fn with_ip_key(mut self, key: impl Into<String>) -> Self {
        self.ip_key = Some(key.into());
        self
    }

    /// Sets the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ContextMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the id strategy.
    #[must_use]
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }
}

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enables or disables JSON output.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Seeding configuration.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Environment variable selecting the id strategy.
    pub const ENV_ID_STRATEGY: &'static str = "REQUEST_CONTEXT_ID_STRATEGY";
    /// Environment variable selecting the mode.
    pub const ENV_MODE: &'static str = "REQUEST_CONTEXT_MODE";
    /// Environment variable holding the log filter.
    pub const ENV_LOG: &'static str = "REQUEST_CONTEXT_LOG";
    /// Environment variable enabling JSON logs.
    pub const ENV_LOG_JSON: &'static str = "REQUEST_CONTEXT_LOG_JSON";

    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an unrecognized value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an unrecognized value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(Self::ENV_ID_STRATEGY) {
            config.seed.id_strategy = value.parse()?;
        }
        if let Some(value) = lookup(Self::ENV_MODE) {
            config.seed.mode = value.parse()?;
        }
        if let Some(value) = lookup(Self::ENV_LOG) {
            config.logging.filter = value;
        }
        if let Some(value) = lookup(Self::ENV_LOG_JSON) {
            config.logging.json = parse_bool(Self::ENV_LOG_JSON, &value)?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::new(key, format!("expected a boolean, got '{other}'"))),
    }
}
