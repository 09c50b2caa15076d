//! Configuration for structscan.
//!
//! Configuration lives in an optional YAML file at the project root. Every
//! field has a default, so an absent file or an empty document is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for in the analyzed root, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["structscan.yaml", ".structscan.yaml"];

/// Directories skipped while scanning unless overridden.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    ".hg",
    ".svn",
    ".tox",
    ".venv",
    "venv",
    ".mypy_cache",
    ".pytest_cache",
    "build",
    "dist",
    "node_modules",
];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Name of the instance receiver (first parameter of methods).
    #[serde(default = "default_receiver")]
    pub receiver: String,
    /// Method name treated as an event emission by the signal heuristic.
    #[serde(default = "default_signal_call")]
    pub signal_call: String,
    /// File extensions to analyze (without dot).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Directory names never descended into.
    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,
    /// Skip directories whose name starts with a dot (default: true)
    #[serde(default = "default_true")]
    pub skip_hidden_dirs: bool,
    /// Glob patterns for root-relative paths to exclude (e.g., "**/migrations/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn default_receiver() -> String {
    "self".to_string()
}

fn default_signal_call() -> String {
    "emit".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_ignored_dirs() -> Vec<String> {
    DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: String::new(),
            receiver: default_receiver(),
            signal_call: default_signal_call(),
            extensions: default_extensions(),
            ignored_dirs: default_ignored_dirs(),
            skip_hidden_dirs: true,
            excluded_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a configuration from YAML text. An empty document yields defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load the configuration for a project root.
    ///
    /// An explicit path must exist. Without one, the root is searched for a
    /// default file name and the built-in defaults are used if none is found.
    pub fn load(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(root),
        };

        let config = match path {
            Some(p) => {
                tracing::debug!("loading configuration from {}", p.display());
                Self::parse_file(&p)
                    .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?
            }
            None => Self::default(),
        };

        validate(&config)?;
        Ok(config)
    }

    /// Check whether a file extension is analyzed.
    pub fn handles_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.trim_start_matches('.') == ext)
    }

    /// Check whether a directory name is part of the ignore convention.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        if self.skip_hidden_dirs && name.starts_with('.') {
            return true;
        }
        self.ignored_dirs.iter().any(|d| d == name)
    }

    /// Build a matcher for `excluded_paths`. Returns `None` when no pattern is set.
    pub fn exclusion_matcher(&self) -> anyhow::Result<Option<globset::GlobSet>> {
        if self.excluded_paths.is_empty() {
            return Ok(None);
        }
        let mut builder = globset::GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(globset::Glob::new(pattern)?);
        }
        Ok(Some(builder.build()?))
    }
}

/// Find a configuration file in `root`.
pub fn discover(root: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if !is_identifier(&config.receiver) {
        anyhow::bail!("invalid receiver {:?}, must be an identifier", config.receiver);
    }

    if !is_identifier(&config.signal_call) {
        anyhow::bail!(
            "invalid signal_call {:?}, must be an identifier",
            config.signal_call
        );
    }

    if config.extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
        anyhow::bail!("extensions must list at least one file extension");
    }

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
