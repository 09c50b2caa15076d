//! Analysis runner: scan, collect, assemble.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rayon::prelude::*;

use crate::analysis::{CollectUnit, FileCollection, PythonCollector, SourceCollector};
use crate::config::Config;
use crate::error::{AnalysisError, FileWarning};
use crate::model::{self, ProjectModel};
use crate::scanner;

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub model: ProjectModel,
    /// Files left out of the model, scan order.
    pub warnings: Vec<FileWarning>,
}

impl Analysis {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Builds a [`ProjectModel`] for a project root.
pub struct Analyzer {
    root: PathBuf,
    config: Config,
    parallel: bool,
}

impl Analyzer {
    /// Create an analyzer with default configuration.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config: Config::default(),
            parallel: false,
        }
    }

    /// Use the given configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Collect files on the rayon pool. Output order does not change.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the analysis.
    ///
    /// Fails only when the root is unusable or the configuration is invalid;
    /// files that cannot be read or parsed become warnings.
    pub fn run(&self) -> Result<Analysis, AnalysisError> {
        let scan = scanner::scan(&self.root, &self.config)?;
        let collector = PythonCollector::new(&self.config.receiver);

        let rel_paths: Vec<String> = scan
            .files
            .iter()
            .map(|p| scanner::relative_path(&self.root, p))
            .collect();
        let prefixes = key_prefixes(&rel_paths);

        let units: Vec<(&PathBuf, CollectUnit)> = scan
            .files
            .iter()
            .zip(rel_paths.iter().zip(prefixes.iter()))
            .map(|(path, (rel, prefix))| {
                (
                    path,
                    CollectUnit {
                        rel_path: rel,
                        key_prefix: prefix,
                    },
                )
            })
            .collect();

        let results: Vec<Result<FileCollection, FileWarning>> = if self.parallel {
            units
                .par_iter()
                .map(|(path, unit)| collect_one(&collector, path, unit))
                .collect()
        } else {
            units
                .iter()
                .map(|(path, unit)| collect_one(&collector, path, unit))
                .collect()
        };

        let mut warnings = scan.warnings;
        let mut collections = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(collection) => collections.push(collection),
                Err(warning) => warnings.push(warning),
            }
        }

        let canonical = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        let project_name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| canonical.display().to_string());

        let model = model::assemble(
            &project_name,
            &canonical.display().to_string(),
            Utc::now(),
            collections,
        );

        tracing::info!(
            "analyzed {} files: {} classes, {} methods, {} skipped",
            model.stats.total_files,
            model.stats.total_classes,
            model.stats.total_methods,
            warnings.len()
        );

        Ok(Analysis { model, warnings })
    }
}

fn collect_one(
    collector: &dyn SourceCollector,
    path: &Path,
    unit: &CollectUnit,
) -> Result<FileCollection, FileWarning> {
    collector.collect_file(path, unit).map_err(|e| {
        tracing::warn!("skipping {}: {}", unit.rel_path, e);
        FileWarning::from_collect_error(unit.rel_path, &e)
    })
}

/// Class-key prefix for each file.
///
/// The file stem when no other scanned file shares it, otherwise the
/// extension-less relative path with `/` replaced by `.`.
pub fn key_prefixes(rel_paths: &[String]) -> Vec<String> {
    let stems: Vec<&str> = rel_paths.iter().map(|p| stem_of(p)).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(*stem).or_default() += 1;
    }

    rel_paths
        .iter()
        .zip(stems.iter())
        .map(|(path, stem)| {
            if counts[stem] == 1 {
                stem.to_string()
            } else {
                let without_ext = match path.rfind('.') {
                    Some(dot) if dot > path.rfind('/').map_or(0, |s| s + 1) => &path[..dot],
                    _ => path.as_str(),
                };
                without_ext.replace('/', ".")
            }
        })
        .collect()
}

fn stem_of(rel_path: &str) -> &str {
    let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}
