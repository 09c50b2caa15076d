//! Source file enumeration.
//!
//! Walks the project root, skipping directories named by the ignore
//! convention and keeping files whose extension is analyzed.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{AnalysisError, FileWarning, WarningKind};

/// Files found under a root, in traversal order.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<PathBuf>,
    /// Entries that could not be read during the walk.
    pub warnings: Vec<FileWarning>,
}

/// Check that `root` is an existing, listable directory.
pub fn validate_root(root: &Path) -> Result<(), AnalysisError> {
    let metadata = fs::metadata(root).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AnalysisError::RootNotFound(root.to_path_buf())
        } else {
            AnalysisError::RootUnreadable {
                path: root.to_path_buf(),
                source: e,
            }
        }
    })?;

    if !metadata.is_dir() {
        return Err(AnalysisError::RootNotDirectory(root.to_path_buf()));
    }

    fs::read_dir(root).map_err(|e| AnalysisError::RootUnreadable {
        path: root.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Enumerate candidate source files under `root`.
///
/// The root is validated first; an unusable root is the only error.
pub fn scan(root: &Path, config: &Config) -> Result<ScanOutcome, AnalysisError> {
    validate_root(root)?;

    let excluded = config
        .exclusion_matcher()
        .map_err(|e| AnalysisError::Config(e.to_string()))?;

    let mut outcome = ScanOutcome::default();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // The root itself is never filtered, whatever its name.
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !config.is_ignored_dir(&name)
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| relative_path(root, p))
                    .unwrap_or_else(|| "<unknown>".to_string());
                tracing::warn!("skipping unreadable entry {}: {}", path, e);
                outcome
                    .warnings
                    .push(FileWarning::new(path, WarningKind::Unreadable, e.to_string()));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !config.handles_extension(ext) {
            continue;
        }

        if let Some(matcher) = &excluded {
            if matcher.is_match(relative_path(root, path)) {
                continue;
            }
        }

        outcome.files.push(path.to_path_buf());
    }

    tracing::info!("found {} source files under {}", outcome.files.len(), root.display());
    Ok(outcome)
}

/// Root-relative path with forward slashes.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
