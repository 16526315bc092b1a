//! Assertions that units of work did not observe each other's context.

use crate::context::ContextData;
use crate::errors::ContextLeakError;
use crate::keys::REQUEST_ID;
use serde_json::Value;
use std::collections::HashSet;

/// Checks that every result carries a distinct `requestId`.
///
/// # Errors
///
/// Returns `ContextLeakError` if a result lacks the key or two results
/// share a value.
pub fn assert_no_leak(results: &[ContextData]) -> Result<(), ContextLeakError> {
    assert_no_leak_by(results, REQUEST_ID.name())
}

/// Checks that every result carries a distinct value under `key`.
///
/// # Errors
///
/// Returns `ContextLeakError` if a result lacks the key or two results
/// share a value.
pub fn assert_no_leak_by(results: &[ContextData], key: &str) -> Result<(), ContextLeakError> {
    let mut seen = HashSet::with_capacity(results.len());
    let mut duplicates = Vec::new();

    for (index, result) in results.iter().enumerate() {
        let value = match result.get(key) {
            None | Some(Value::Null) => {
                return Err(ContextLeakError::new(format!(
                    "Result at index {index} is missing {key} property"
                )));
            }
            Some(value) => value.to_string(),
        };

        if !seen.insert(value.clone()) && !duplicates.contains(&value) {
            duplicates.push(value);
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        tracing::warn!(?duplicates, "Context leak detected");
        Err(ContextLeakError::new(format!(
            "Context leak detected: duplicate {key} values found: {}",
            duplicates.join(", ")
        )))
    }
}
