use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// AST parser for Rust source files.
///
/// Wraps `syn::parse_file` and keeps the raw source text alongside the syntax
/// tree. The raw text matters: the nested-schema parser works on source lines
/// addressed by span positions, not on the AST.
pub struct AstParser;

/// A successfully parsed Rust file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Raw source text, line-addressable
    pub source: String,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl ParsedFile {
    /// The source split into lines, in file order.
    pub fn lines(&self) -> Vec<String> {
        self.source.lines().map(|l| l.to_string()).collect()
    }
}

impl AstParser {
    /// Parses a single Rust source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust
    /// syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = syn::parse_file(&source)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
            syntax_tree,
        })
    }

    /// Parses multiple files, skipping those that fail.
    ///
    /// Unparseable files are logged as warnings and dropped so documentation
    /// can still be generated from the rest of the project.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<ParsedFile> {
        let parsed: Vec<ParsedFile> = paths
            .iter()
            .filter_map(|path| match Self::parse_file(path) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        debug!("Parsed {} of {} files", parsed.len(), paths.len());
        parsed
    }
}
