//! AST-backed fact collection.
//!
//! This module turns one source file into a [`FileCollection`] using
//! tree-sitter. Collected facts include:
//! - Top-level classes with their directly nested methods
//! - Module-level functions
//! - Signatures, docstrings and declared line ranges
//! - Parameter, assignment, loop and `with` bindings per method
//! - Imported root modules
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │ Source Files    │────▶│ SourceCollector  │────▶│ FileCollection │
//! └─────────────────┘     │ (Python)         │     │ (per file)     │
//!                         └──────────────────┘     └────────────────┘
//!                                                          │
//!                                                          ▼
//!                                                  ┌────────────────┐
//!                                                  │ model::assemble│
//!                                                  └────────────────┘
//! ```
//!
//! Collection of one file never looks at another file, so files can be
//! collected in any order or in parallel.

mod facts;
mod python;
mod targets;
mod traits;
mod variables;

pub use facts::{
    CollectedClass, CollectedMethod, FileCollection, MethodKey, Parameter, ParameterKind, Span,
    MODULE_OWNER,
};
pub use python::{clean_docstring, signature_text, PythonCollector};
pub use targets::Target;
pub use traits::{CollectUnit, ParsedFile, SourceCollector};
