//! Collision policies for context writes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a write does when its key is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetPolicy {
    /// Fail with a key collision and leave the store unchanged.
    Deny,
    /// Replace the existing value.
    #[default]
    Overwrite,
    /// Keep the existing value without failing.
    Ignore,
}

impl SetPolicy {
    /// Returns the lowercase policy name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deny => "deny",
            Self::Overwrite => "overwrite",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for SetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(Self::Deny),
            "overwrite" => Ok(Self::Overwrite),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!("unknown set policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_overwrite() {
        assert_eq!(SetPolicy::default(), SetPolicy::Overwrite);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Deny".parse::<SetPolicy>(), Ok(SetPolicy::Deny));
        assert_eq!(" ignore ".parse::<SetPolicy>(), Ok(SetPolicy::Ignore));
        assert!("replace".parse::<SetPolicy>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SetPolicy::Deny).unwrap();
        assert_eq!(json, "\"deny\"");

        let policy: SetPolicy = serde_json::from_str("\"overwrite\"").unwrap();
        assert_eq!(policy, SetPolicy::Overwrite);
    }
}
