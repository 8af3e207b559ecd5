//! Documentation configuration.
//!
//! All ambient settings of a generation run (document metadata, servers,
//! language tabs, schema group restriction, the route list itself) live in an
//! explicit [`DocConfig`] loaded from a TOML file and passed into the
//! pipeline; there is no process-wide state.

use crate::error::{Error, Result};
use crate::routes::RouteRecord;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one documentation generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocConfig {
    /// Document title
    #[serde(default = "defaults::title")]
    pub title: String,
    /// Document version string
    #[serde(default = "defaults::version")]
    pub version: String,
    /// Document description
    #[serde(default)]
    pub description: String,
    /// Logo URL for the `x-logo` info extension
    #[serde(default)]
    pub logo: Option<String>,
    /// Logo background color
    #[serde(default)]
    pub color: String,
    /// Base URL used when rendering request samples
    #[serde(default, rename = "base-url")]
    pub base_url: String,
    /// Output directory for the generated `openapi.json`
    #[serde(default = "defaults::output")]
    pub output: String,
    /// Servers advertised in the document
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Language tabs for `x-code-samples`, id -> display label
    #[serde(default = "defaults::language_tabs", rename = "language-tabs")]
    pub language_tabs: IndexMap<String, String>,
    /// Groups whose response resources are emitted into `components.schemas`.
    /// Absent means all groups.
    #[serde(default, rename = "schema-groups")]
    pub schema_groups: Option<Vec<String>>,
    /// Routes to document, in order
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

/// One entry of the document's `servers` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub description: String,
}

mod defaults {
    use indexmap::IndexMap;

    pub fn title() -> String {
        "API Reference".to_string()
    }

    pub fn version() -> String {
        "v1".to_string()
    }

    pub fn output() -> String {
        "docs".to_string()
    }

    pub fn language_tabs() -> IndexMap<String, String> {
        let mut tabs = IndexMap::new();
        tabs.insert("bash".to_string(), "Bash".to_string());
        tabs.insert("javascript".to_string(), "Javascript".to_string());
        tabs
    }
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            title: defaults::title(),
            version: defaults::version(),
            description: String::new(),
            logo: None,
            color: String::new(),
            base_url: String::new(),
            output: defaults::output(),
            servers: Vec::new(),
            language_tabs: defaults::language_tabs(),
            schema_groups: None,
            routes: Vec::new(),
        }
    }
}

impl DocConfig {
    /// Loads the configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DocConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Whether response-resource schemas of the given group belong in
    /// `components.schemas`.
    pub fn emits_schemas_for(&self, group: &str) -> bool {
        match &self.schema_groups {
            Some(groups) => groups.iter().any(|g| g == group),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DocConfig::default();
        assert_eq!(config.title, "API Reference");
        assert_eq!(config.version, "v1");
        assert!(config.routes.is_empty());
        assert_eq!(config.language_tabs.len(), 2);
    }

    #[test]
    fn test_load_from_toml() {
        let toml = r#"
            title = "Payments API"
            version = "2.1"
            description = "Payment endpoints."
            base-url = "https://api.example.com"
            schema-groups = ["Payments"]

            [[servers]]
            url = "https://api.example.com"
            description = "Production"

            [[routes]]
            uri = "charges"
            methods = ["POST"]
            handler = "ChargeController::store"

            [routes.apply.headers]
            Authorization = "Bearer token"
        "#;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("idoc.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = DocConfig::load(&path).unwrap();
        assert_eq!(config.title, "Payments API");
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].handler, "ChargeController::store");
        assert_eq!(
            config.routes[0].apply.headers.get("Authorization"),
            Some(&"Bearer token".to_string())
        );
        assert!(config.emits_schemas_for("Payments"));
        assert!(!config.emits_schemas_for("Users"));
    }

    #[test]
    fn test_schema_groups_absent_means_all() {
        let config = DocConfig::default();
        assert!(config.emits_schemas_for("anything"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = DocConfig::load(Path::new("/nonexistent/idoc.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "title = [unclosed").unwrap();
        let result = DocConfig::load(&path);
        assert!(matches!(result, Err(crate::error::Error::Config(_))));
    }
}
