//! Well-known context keys.

use crate::context::ContextKey;
use crate::errors::Result;

/// Correlation id of the unit of work.
pub const REQUEST_ID: ContextKey<String> = ContextKey::new("requestId");

/// Route or operation name.
pub const ROUTE: ContextKey<String> = ContextKey::new("route");

/// Method or verb of the inbound request.
pub const METHOD: ContextKey<String> = ContextKey::new("method");

/// Client address.
pub const IP: ContextKey<String> = ContextKey::new("ip");

/// Returns the ambient request id.
pub fn request_id() -> Result<Option<String>> {
    crate::api::get(&REQUEST_ID)
}

/// Returns the ambient route.
pub fn route() -> Result<Option<String>> {
    crate::api::get(&ROUTE)
}

/// Returns the ambient method.
pub fn method() -> Result<Option<String>> {
    crate::api::get(&METHOD)
}
