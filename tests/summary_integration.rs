//! Integration tests for summaries computed from analyzed projects.

use std::fs;
use std::path::{Path, PathBuf};

use structscan::summary::{ComplexityTier, MODULE_CLASS_NAME, NO_DOCSTRING};
use structscan::{Analyzer, ProjectModel, Summarizer};
use tempfile::TempDir;

fn sample_model() -> ProjectModel {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("sample_project");
    Analyzer::new(root)
        .run()
        .expect("analysis of the sample project should succeed")
        .model
}

/// A method whose slice has `code_lines` code lines plus one comment line.
fn method_source(name: &str, code_lines: usize) -> String {
    let mut source = format!("    def {}(self):\n        # body\n", name);
    for i in 1..code_lines {
        source.push_str(&format!("        v{} = {}\n", i, i));
    }
    source
}

fn analyze_source(file: &str, source: &str) -> ProjectModel {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(file), source).unwrap();
    analyze_dir(temp.path())
}

fn analyze_dir(root: &Path) -> ProjectModel {
    Analyzer::new(root).run().unwrap().model
}

#[test]
fn test_project_summary_totals() {
    let model = sample_model();
    let summary = Summarizer::default().summarize_project(&model);

    assert_eq!(summary.project_name, "sample_project");
    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.total_classes, 5);
    // Eight class methods plus the two module functions of app/main.py.
    assert_eq!(summary.total_methods, 10);
    assert_eq!(summary.metrics.method_count, 10);
    assert_eq!(summary.metrics.class_count, 5);
    assert_eq!(summary.metrics.complexity_distribution.total(), 10);
    assert_eq!(summary.metrics.complexity_distribution.low, 10);
    assert!(summary.metrics.long_methods.is_empty());
}

#[test]
fn test_file_summary_module_pseudo_class_first() {
    let model = sample_model();
    let summary = Summarizer::default()
        .summarize_file(&model, "app/main.py")
        .expect("file is part of the model");

    assert_eq!(summary.file_path, "app/main.py");
    assert_eq!(summary.total_classes, 1);
    assert_eq!(summary.total_methods, 5);

    let names: Vec<&str> = summary.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec![MODULE_CLASS_NAME, "Application"]);

    let module = &summary.classes[0];
    assert!(module.is_module_level);
    assert_eq!(module.key, "app/main.py::<module>");
    let functions: Vec<&str> = module.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(functions, vec!["main", "serve"]);

    let application = &summary.classes[1];
    assert!(!application.is_module_level);
    assert_eq!(application.key, "main.Application");
    assert_eq!(application.method_count, 3);
}

#[test]
fn test_unknown_file_has_no_summary() {
    let model = sample_model();
    assert!(Summarizer::default()
        .summarize_file(&model, "missing.py")
        .is_none());
}

#[test]
fn test_method_summary_fields() {
    let model = sample_model();
    let summarizer = Summarizer::default();
    let class = model.class("main.Application").unwrap();

    let load = summarizer.summarize_method(&class.methods[1]);
    assert_eq!(load.name, "load");
    assert_eq!(load.params, vec!["self", "paths"]);
    assert_eq!(load.signals, vec!["finished"]);
    assert_eq!(load.docstring, "Load every document in paths.");
    assert!(load.has_docstring);
    assert_eq!(load.complexity, ComplexityTier::Low);
    assert_eq!(load.start_line, 18);
    assert_eq!(load.end_line, 25);
    assert_eq!(load.total_lines, 8);
    assert_eq!(load.code_lines, 8);

    let init = summarizer.summarize_method(&class.methods[0]);
    assert_eq!(init.params, vec!["self", "name", "debug"]);
    assert_eq!(init.docstring, NO_DOCSTRING);
    assert!(!init.has_docstring);
    assert!(init.signals.is_empty());
}

#[test]
fn test_undocumented_class_percentage() {
    let model = sample_model();
    let class = model.class("models.Document").unwrap();
    let summary = Summarizer::default().summarize_class(class);

    assert_eq!(summary.method_count, 3);
    assert_eq!(summary.metrics.undocumented_count, 3);
    assert_eq!(summary.metrics.undocumented_percentage, 100.0);
}

#[test]
fn test_signature_params_match_parameters() {
    let model = sample_model();
    let summarizer = Summarizer::default();

    let methods = model
        .classes
        .values()
        .flat_map(|c| c.methods.iter())
        .chain(model.files_data.values().flat_map(|f| f.functions.iter()));

    let mut checked = 0;
    for method in methods {
        if method.local_vars.parameters.iter().any(|p| p.starts_with('*')) {
            continue;
        }
        let summary = summarizer.summarize_method(method);
        assert_eq!(
            summary.params, method.local_vars.parameters,
            "params of {} should match the parameters bucket",
            method.signature
        );
        checked += 1;
    }
    assert!(checked >= 8, "only {} methods checked", checked);
}

#[test]
fn test_long_methods_and_histogram() {
    let mut source = String::from("class Big:\n");
    source.push_str(&method_source("fairly_long", 51));
    source.push('\n');
    source.push_str(&method_source("very_long", 101));
    let model = analyze_source("big.py", &source);

    let class = model.class("big.Big").unwrap();
    let summary = Summarizer::default().summarize_class(class);
    let metrics = &summary.metrics;

    let long: Vec<(&str, usize)> = metrics
        .long_methods
        .iter()
        .map(|m| (m.name.as_str(), m.lines))
        .collect();
    assert_eq!(long, vec![("very_long", 101), ("fairly_long", 51)]);
    assert_eq!(metrics.long_methods_count, 2);
    assert_eq!(metrics.complexity_distribution.high, 1);
    assert_eq!(metrics.complexity_distribution.critical, 1);
    assert_eq!(metrics.complexity_distribution.low, 0);
    assert_eq!(metrics.complexity_distribution.medium, 0);
}

#[test]
fn test_tier_boundaries_from_source() {
    let counts = [19, 20, 21, 49, 50, 51, 99, 100, 101];
    let mut source = String::from("class Sized:\n");
    for n in counts {
        source.push_str(&method_source(&format!("m{}", n), n));
        source.push('\n');
    }
    let model = analyze_source("sized.py", &source);
    let class = model.class("sized.Sized").unwrap();
    let summarizer = Summarizer::default();

    let expected = [
        ComplexityTier::Low,
        ComplexityTier::Low,
        ComplexityTier::Medium,
        ComplexityTier::Medium,
        ComplexityTier::Medium,
        ComplexityTier::High,
        ComplexityTier::High,
        ComplexityTier::High,
        ComplexityTier::Critical,
    ];

    assert_eq!(class.methods.len(), counts.len());
    for ((method, n), tier) in class.methods.iter().zip(counts).zip(expected) {
        let summary = summarizer.summarize_method(method);
        assert_eq!(summary.code_lines, n, "{}", method.name);
        assert_eq!(summary.total_lines, n + 1, "{}", method.name);
        assert!(summary.code_lines <= summary.total_lines);
        assert_eq!(summary.complexity, tier, "{} code lines", n);
        assert_eq!(summary.is_long, n > 50);
        assert_eq!(summary.is_complex, n > 20);
    }
}

#[test]
fn test_median_and_average() {
    let mut source = String::from("class Mixed:\n");
    for (i, n) in [2, 4, 9, 3].into_iter().enumerate() {
        source.push_str(&method_source(&format!("m{}", i), n));
    }
    let model = analyze_source("mixed.py", &source);
    let summary = Summarizer::default().summarize_class(model.class("mixed.Mixed").unwrap());

    // Sorted lengths 2, 3, 4, 9: upper median.
    assert_eq!(summary.metrics.median_method_length, 4);
    assert_eq!(summary.metrics.average_method_length, 4.5);
    assert_eq!(summary.code_lines, 18);
}

#[test]
fn test_configured_signal_call() {
    let source = "class Emitter:\n    def fire(self):\n        self.changed.send(1)\n        self.saved.emit()\n";
    let model = analyze_source("emitter.py", source);
    let method = &model.class("emitter.Emitter").unwrap().methods[0];

    let config = structscan::Config {
        signal_call: "send".to_string(),
        ..Default::default()
    };
    let summarizer = Summarizer::new(&config).unwrap();
    assert_eq!(summarizer.summarize_method(method).signals, vec!["changed"]);
    assert_eq!(Summarizer::default().summarize_method(method).signals, vec!["saved"]);
}

#[test]
fn test_summary_from_saved_model() {
    let model = sample_model();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("model.json");
    model.write_json(&path).unwrap();

    let restored = ProjectModel::read_json(&path).unwrap();
    let summarizer = Summarizer::default();
    let fresh = summarizer.summarize_project(&model);
    let saved = summarizer.summarize_project(&restored);

    assert_eq!(fresh.total_methods, saved.total_methods);
    assert_eq!(fresh.metrics, saved.metrics);
    assert_eq!(fresh.files.len(), saved.files.len());
}
