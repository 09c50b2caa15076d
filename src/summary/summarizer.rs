//! Summaries of methods, classes, files and whole projects.

use chrono::Utc;

use super::{
    count_code_lines, params_from_signature, AggregateMetrics, ClassSummary, ComplexityTier,
    FileSummary, MethodSummary, ProjectSummary, SignalDetector, COMPLEX_METHOD_LINES,
    LONG_METHOD_LINES,
};
use crate::config::Config;
use crate::model::{ClassRecord, MethodRecord, ProjectModel};

/// Name of the pseudo-class grouping module-level functions.
pub const MODULE_CLASS_NAME: &str = "<module>";

/// Display text for an absent docstring.
pub const NO_DOCSTRING: &str = "No docstring";

const DOCSTRING_DISPLAY_MAX: usize = 120;

/// Computes summaries from a frozen model.
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    signals: SignalDetector,
}

impl Summarizer {
    /// Summarizer using the receiver and emit names of `config`.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let signals = SignalDetector::new(&config.receiver, &config.signal_call)?;
        Ok(Self { signals })
    }

    pub fn summarize_method(&self, method: &MethodRecord) -> MethodSummary {
        let code_lines = count_code_lines(&method.code);
        MethodSummary {
            name: method.name.clone(),
            signature: method.signature.clone(),
            params: params_from_signature(&method.signature),
            docstring: docstring_display(&method.docstring),
            has_docstring: method.has_docstring(),
            signals: self.signals.detect(&method.code),
            complexity: ComplexityTier::from_code_lines(code_lines),
            is_long: code_lines > LONG_METHOD_LINES,
            is_complex: code_lines > COMPLEX_METHOD_LINES,
            start_line: method.lines.start,
            end_line: method.lines.end,
            total_lines: method.lines.len(),
            code_lines,
        }
    }

    pub fn summarize_class(&self, class: &ClassRecord) -> ClassSummary {
        self.group(&class.name, &class.key, false, &class.methods)
    }

    /// Summary of one file of the model, `None` if the file is unknown.
    ///
    /// Module-level functions come first as a pseudo-class, followed by the
    /// file's classes in declaration order.
    pub fn summarize_file(&self, model: &ProjectModel, file: &str) -> Option<FileSummary> {
        let data = model.files_data.get(file)?;

        let mut classes = Vec::with_capacity(data.class_keys.len() + 1);
        if !data.functions.is_empty() {
            let key = format!("{}::{}", file, MODULE_CLASS_NAME);
            classes.push(self.group(MODULE_CLASS_NAME, &key, true, &data.functions));
        }
        classes.extend(model.classes_in_file(file).map(|c| self.summarize_class(c)));

        let total_classes = classes.iter().filter(|c| !c.is_module_level).count();
        let metrics = AggregateMetrics::from_methods(
            classes.iter().flat_map(|c| c.methods.iter()),
            total_classes,
        );

        Some(FileSummary {
            file_path: file.to_string(),
            generated_at: Utc::now(),
            total_classes,
            total_methods: metrics.method_count,
            classes,
            metrics,
        })
    }

    /// Summary of every file in model order, with project-wide aggregates.
    pub fn summarize_project(&self, model: &ProjectModel) -> ProjectSummary {
        let files: Vec<FileSummary> = model
            .files
            .iter()
            .filter_map(|f| self.summarize_file(model, f))
            .collect();

        let total_classes = files.iter().map(|f| f.total_classes).sum();
        let metrics = AggregateMetrics::from_methods(
            files
                .iter()
                .flat_map(|f| f.classes.iter())
                .flat_map(|c| c.methods.iter()),
            total_classes,
        );

        ProjectSummary {
            project_name: model.project_name.clone(),
            generated_at: Utc::now(),
            total_files: files.len(),
            total_classes,
            total_methods: metrics.method_count,
            metrics,
            files,
        }
    }

    fn group(&self, name: &str, key: &str, is_module_level: bool, methods: &[MethodRecord]) -> ClassSummary {
        let methods: Vec<MethodSummary> = methods.iter().map(|m| self.summarize_method(m)).collect();
        let class_count = usize::from(!is_module_level);
        let metrics = AggregateMetrics::from_methods(&methods, class_count);

        ClassSummary {
            name: name.to_string(),
            key: key.to_string(),
            is_module_level,
            method_count: methods.len(),
            total_lines: metrics.total_lines,
            code_lines: metrics.total_code_lines,
            methods,
            metrics,
        }
    }
}

/// First line of a docstring, truncated to 120 characters.
pub fn docstring_display(docstring: &str) -> String {
    let first = docstring.lines().next().unwrap_or("").trim();
    if first.is_empty() {
        return NO_DOCSTRING.to_string();
    }
    if first.chars().count() > DOCSTRING_DISPLAY_MAX {
        let head: String = first.chars().take(DOCSTRING_DISPLAY_MAX - 3).collect();
        return format!("{}...", head);
    }
    first.to_string()
}
