//! Structscan - structural analyzer for Python projects.
//!
//! Structscan walks a project root, parses every source file with
//! tree-sitter and builds an immutable structural model: files, their
//! top-level classes, each class's methods with signatures, docstrings,
//! line ranges and variable usage. Size, complexity and documentation
//! metrics are derived from that model on demand.
//!
//! # Architecture
//!
//! - `scanner`: enumerates candidate files under the root
//! - `analysis`: per-file fact collection (tree-sitter)
//! - `model`: the structural model and its assembly from collected facts
//! - `analyzer`: runs scan, collection and assembly
//! - `summary`: metrics and summaries computed from a model
//! - `config`: YAML configuration
//! - `report`: output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```no_run
//! use structscan::{Analyzer, Summarizer};
//!
//! let analysis = Analyzer::new("path/to/project").run()?;
//! let summary = Summarizer::default().summarize_project(&analysis.model);
//! println!("{} methods", summary.total_methods);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod scanner;
pub mod summary;

pub use analyzer::{Analysis, Analyzer};
pub use config::Config;
pub use error::{AnalysisError, CollectError, FileWarning, WarningKind};
pub use model::{ClassRecord, LineRange, LocalVariables, MethodRecord, ProjectModel, SourceFile};
pub use summary::{
    AggregateMetrics, ClassSummary, ComplexityTier, FileSummary, MethodSummary, ProjectSummary,
    Summarizer,
};
