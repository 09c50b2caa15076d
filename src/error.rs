//! Error types and per-file warnings.
//!
//! Only a bad project root stops a run. Everything that goes wrong with a
//! single file is turned into a [`FileWarning`] and the file is left out of
//! the model.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors for a whole analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("project root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("project root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("cannot read project root {}: {source}", .path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Errors raised while collecting facts from a single file.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("cannot read file: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("file is not valid UTF-8")]
    InvalidUtf8,

    #[error("syntax error near line {line}")]
    SyntaxInvalid { line: usize },

    #[error("parser failure: {0}")]
    Parser(String),
}

impl CollectError {
    /// Warning category for this error.
    pub fn warning_kind(&self) -> WarningKind {
        match self {
            CollectError::Unreadable(_) | CollectError::InvalidUtf8 => WarningKind::Unreadable,
            CollectError::SyntaxInvalid { .. } | CollectError::Parser(_) => {
                WarningKind::SyntaxInvalid
            }
        }
    }
}

/// Category of a skipped file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Unreadable,
    SyntaxInvalid,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Unreadable => "unreadable",
            WarningKind::SyntaxInvalid => "syntax_invalid",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file that was skipped during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWarning {
    /// Path relative to the project root.
    pub path: String,
    pub kind: WarningKind,
    pub message: String,
}

impl FileWarning {
    pub fn new(path: impl Into<String>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Build a warning from a collection error.
    pub fn from_collect_error(path: impl Into<String>, err: &CollectError) -> Self {
        Self::new(path, err.warning_kind(), err.to_string())
    }
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.kind, self.message)
    }
}
