//! Route supplier types.
//!
//! The generator consumes routes as an opaque, ordered sequence of
//! [`RouteRecord`]s. Each record names the handler backing the route
//! (`Type::method`), the HTTP methods and URI template it is registered under,
//! and the per-route rule overrides applied while documenting it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One candidate route handed to the annotation parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    /// URI template, without a leading slash (e.g. `users/{id}`)
    pub uri: String,
    /// HTTP methods the route is registered under
    pub methods: Vec<String>,
    /// Handler identity, `Type::method` (optionally module-qualified)
    pub handler: String,
    /// Rules applied to this route while generating documentation
    #[serde(default)]
    pub apply: RuleOverrides,
}

/// Per-route documentation rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleOverrides {
    /// Headers injected into the documented request examples
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Live response-call policy for this route
    #[serde(default, rename = "response-calls")]
    pub response_calls: ResponseCallPolicy,
}

/// Controls whether a live API call may be attempted to capture an example
/// response when the route declares no response resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseCallPolicy {
    /// Methods eligible for a probe (`"*"` for all). Empty disables probing.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ResponseCallPolicy {
    /// Whether the policy allows probing a route registered under `methods`.
    pub fn allows(&self, methods: &[String]) -> bool {
        self.methods.iter().any(|allowed| {
            allowed == "*" || methods.iter().any(|m| m.eq_ignore_ascii_case(allowed))
        })
    }
}

impl RouteRecord {
    /// Ordered HTTP methods of the route, uppercased, with `HEAD` excluded.
    pub fn documented_methods(&self) -> Vec<String> {
        self.methods
            .iter()
            .map(|m| m.to_ascii_uppercase())
            .filter(|m| m != "HEAD")
            .collect()
    }

    /// Deterministic identity of the route: the SHA-256 digest of the URI and
    /// the documented method list.
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.uri.as_bytes());
        hasher.update(b":");
        hasher.update(self.documented_methods().join("").as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
