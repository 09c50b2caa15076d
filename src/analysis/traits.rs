//! Core traits for source collection.

use std::path::Path;

use super::FileCollection;
use crate::error::CollectError;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from [`FileCollection`] so a tree can be inspected more
/// than once without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// Root-relative path, forward slashes.
    pub path: String,
}

impl ParsedFile {
    /// Get the source code as a string slice.
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Per-file inputs that depend on the rest of the project.
#[derive(Debug, Clone)]
pub struct CollectUnit<'a> {
    /// Root-relative path, forward slashes.
    pub rel_path: &'a str,
    /// Prefix for class keys declared in this file.
    pub key_prefix: &'a str,
}

/// Language-specific collector.
///
/// # Thread Safety
///
/// `tree_sitter::Parser` is not `Sync`, so implementations create a parser
/// per call.
pub trait SourceCollector: Send + Sync {
    /// Parse a source file.
    ///
    /// Fails with [`CollectError::InvalidUtf8`] for undecodable input and
    /// [`CollectError::SyntaxInvalid`] when the tree contains errors.
    fn parse(&self, rel_path: &str, source: Vec<u8>) -> Result<ParsedFile, CollectError>;

    /// Collect classes, functions, imports and variables from a parsed file.
    fn collect(&self, parsed: &ParsedFile, unit: &CollectUnit) -> Result<FileCollection, CollectError>;

    /// Read, parse and collect one file.
    fn collect_file(&self, path: &Path, unit: &CollectUnit) -> Result<FileCollection, CollectError> {
        let source = std::fs::read(path)?;
        let parsed = self.parse(unit.rel_path, source)?;
        self.collect(&parsed, unit)
    }
}
