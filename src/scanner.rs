use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Recursive scanner collecting the Rust source files of a project.
///
/// Skips `target/` and hidden directories. Inaccessible entries are logged and
/// scanning continues; only an unreadable root is fatal.
pub struct SourceScanner {
    root: PathBuf,
}

impl SourceScanner {
    /// Creates a scanner rooted at the given project directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Walks the directory tree and returns all `.rs` files found, in
    /// traversal order.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        debug!("Scanning {} for Rust sources", self.root.display());
        let mut sources = Vec::new();

        for entry in WalkDir::new(&self.root).into_iter().filter_entry(|e| {
            if e.path() == self.root {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && name != "target"
        }) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        sources.push(path.to_path_buf());
                    }
                }
                Err(e) => warn!("Failed to access path while scanning: {}", e),
            }
        }

        debug!("Found {} Rust files", sources.len());
        Ok(sources)
    }
}
