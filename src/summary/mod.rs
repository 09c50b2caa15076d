//! Derived summaries over a frozen [`ProjectModel`](crate::model::ProjectModel).
//!
//! Summaries are recomputed on every request and never stored in the model.

mod metrics;
mod signals;
mod signature;
mod summarizer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use metrics::{
    count_code_lines, round1, AggregateMetrics, ComplexityDistribution, ComplexityTier, LongMethod,
    COMPLEX_METHOD_LINES, LONG_METHOD_LINES, TOP_LONG_METHODS,
};
pub use signals::SignalDetector;
pub use signature::params_from_signature;
pub use summarizer::{docstring_display, Summarizer, MODULE_CLASS_NAME, NO_DOCSTRING};

/// Metrics of one method or module-level function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSummary {
    pub name: String,
    pub signature: String,
    /// Parameter names recovered from `signature`.
    pub params: Vec<String>,
    /// Display form of the docstring.
    pub docstring: String,
    pub has_docstring: bool,
    pub signals: Vec<String>,
    pub complexity: ComplexityTier,
    pub is_long: bool,
    pub is_complex: bool,
    pub start_line: usize,
    pub end_line: usize,
    pub total_lines: usize,
    pub code_lines: usize,
}

/// A class, or the module-level pseudo-class of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub name: String,
    pub key: String,
    pub is_module_level: bool,
    pub methods: Vec<MethodSummary>,
    pub method_count: usize,
    pub total_lines: usize,
    pub code_lines: usize,
    pub metrics: AggregateMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub file_path: String,
    pub generated_at: DateTime<Utc>,
    /// Real classes; the module pseudo-class is not counted.
    pub total_classes: usize,
    /// Methods and module-level functions.
    pub total_methods: usize,
    pub classes: Vec<ClassSummary>,
    pub metrics: AggregateMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_name: String,
    pub generated_at: DateTime<Utc>,
    pub total_files: usize,
    pub total_classes: usize,
    pub total_methods: usize,
    pub metrics: AggregateMetrics,
    pub files: Vec<FileSummary>,
}

/// Either summary shape, for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    File(FileSummary),
    Project(ProjectSummary),
}
