use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the generation pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the generation pipeline.
///
/// Authoring errors (`MalformedTag`, `UnresolvedResource`, `UnbalancedSchema`)
/// abort the run: a document silently missing an endpoint is worse than a
/// refused one. I/O and serialization failures are likewise fatal. Skippable
/// routes and probe failures never surface here; they are logged and the
/// pipeline continues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed `@{tag}` annotation on `{handler}`: {content:?} does not match `<name> <type> [required] [description]`")]
    MalformedTag {
        handler: String,
        tag: String,
        content: String,
    },

    #[error(
        "error in @responseResource annotation on `{handler}`: type `{resource}` does not exist \
         or has no `to_representation` method. Provide the type name as it appears in the scanned \
         sources, e.g. `@responseResource 200 UserResource`"
    )]
    UnresolvedResource { handler: String, resource: String },

    #[error("unbalanced schema nesting in `{resource}`: {open} scope(s) opened but never closed")]
    UnbalancedSchema { resource: String, open: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
