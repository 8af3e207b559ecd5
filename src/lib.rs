//! OpenAPI Annotation Generator - OpenAPI 3.0 documents from annotated route handlers.
//!
//! This library generates OpenAPI 3.0 documentation by combining an explicit
//! route list (from a TOML configuration file) with doc-comment annotations
//! found on the handlers those routes point to. Handlers declare their
//! parameters with `@bodyParam` / `@queryParam` / `@pathParam` tags, their
//! group with `@group`, their auth requirement with `@authenticated`, and
//! their response shape with `@responseResource` references to resource types
//! whose representation methods carry nested `@responseParam` schemas.
//!
//! # Architecture
//!
//! The pipeline runs as a single-threaded batch:
//!
//! 1. [`config`] - Loads the run configuration and the route list
//! 2. [`scanner`] - Recursively scans the project directory for Rust files
//! 3. [`parser`] - Parses source files into syntax trees
//! 4. [`resolver`] - Resolves `Type::method` handlers and resource types
//! 5. [`docblock`] - Splits doc comments into short/long text and `@tags`
//! 6. [`annotation`] - Turns one route record into a [`annotation::RouteDescriptor`]
//! 7. [`schema_parser`] - Parses nested `@responseParam` schemas
//! 8. [`response`] - Optional example-response capture
//! 9. [`samples`] - Request examples for `x-code-samples`
//! 10. [`openapi_builder`] - Assembles the complete OpenAPI document
//! 11. [`serializer`] - Serializes the document to JSON or YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_annotations::{
//!     annotation::AnnotationParser,
//!     config::DocConfig,
//!     openapi_builder::OpenApiBuilder,
//!     parser::AstParser,
//!     resolver::SourceResolver,
//!     response::NullResponseResolver,
//!     scanner::SourceScanner,
//!     serializer::{serialize, OutputFormat},
//! };
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = DocConfig::load(Path::new("idoc.toml"))?;
//!
//! let files = SourceScanner::new(PathBuf::from("src")).scan()?;
//! let resolver = SourceResolver::new(AstParser::parse_files(&files));
//! let parser = AnnotationParser::new(&resolver);
//!
//! let mut routes = Vec::new();
//! for record in &config.routes {
//!     if let Some(route) = parser.process_route(record, &NullResponseResolver)? {
//!         routes.push(route);
//!     }
//! }
//!
//! let document = OpenApiBuilder::new(&config).build(&routes);
//! println!("{}", serialize(&document, OutputFormat::Json)?);
//! # Ok(())
//! # }
//! ```

pub mod annotation;
pub mod cli;
pub mod config;
pub mod docblock;
pub mod error;
pub mod openapi_builder;
pub mod parser;
pub mod resolver;
pub mod response;
pub mod routes;
pub mod samples;
pub mod scanner;
pub mod schema_parser;
pub mod serializer;
