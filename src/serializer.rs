//! Document serialization.
//!
//! The assembled document is emitted as pretty-printed JSON (the primary
//! artifact) or as YAML. Key order is preserved end to end, so serializing
//! the same document twice produces identical bytes.

use crate::error::Result;
use crate::openapi_builder::OpenApiDocument;
use log::info;
use std::fs;
use std::path::Path;

/// Output format of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// Artifact file name for this format.
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Json => "openapi.json",
            OutputFormat::Yaml => "openapi.yaml",
        }
    }
}

/// Serializes the document in the requested format.
pub fn serialize(document: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(document)?,
        OutputFormat::Yaml => serde_yaml::to_string(document)?,
    };
    Ok(output)
}

/// Writes serialized output to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| crate::error::Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| crate::error::Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {}", path.display());
    Ok(())
}
