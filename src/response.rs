//! Example-response resolution.
//!
//! Capturing a live example response is an external concern: the engine only
//! asks a [`ResponseResolver`] for an optional JSON body when a route declares
//! no response resource and its response-call policy allows a probe. A probe
//! failure degrades to "no captured example" for that route; it is never
//! fatal.

use crate::routes::RouteRecord;
use anyhow::Result;

/// Collaborator that may capture an example response body for a route.
pub trait ResponseResolver {
    /// Returns a captured example response body (expected to be JSON), or
    /// `None` when no example could be obtained.
    fn resolve(&self, record: &RouteRecord) -> Result<Option<String>>;
}

/// Resolver that never probes. Used when response calls are disabled.
pub struct NullResponseResolver;

impl ResponseResolver for NullResponseResolver {
    fn resolve(&self, _record: &RouteRecord) -> Result<Option<String>> {
        Ok(None)
    }
}
