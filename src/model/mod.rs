//! The structural model: files -> classes -> methods.
//!
//! A [`ProjectModel`] is built once per run by [`assemble`] and never mutated
//! afterwards. It is the single document handed to every consumer, and it
//! round-trips through JSON unchanged.

mod assemble;

pub use assemble::assemble;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Inclusive, 1-indexed line range of a declaration.
///
/// Loading a range with `end < start` is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLineRange")]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Deserialize)]
struct RawLineRange {
    start: usize,
    end: usize,
}

impl TryFrom<RawLineRange> for LineRange {
    type Error = String;

    fn try_from(raw: RawLineRange) -> Result<Self, Self::Error> {
        if raw.end < raw.start {
            return Err(format!(
                "line range ends before it starts: {}-{}",
                raw.start, raw.end
            ));
        }
        Ok(Self {
            start: raw.start,
            end: raw.end,
        })
    }
}

impl LineRange {
    /// Build a range, clamping `end` so that `end >= start`.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    /// Always false: a range covers at least its start line.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Names bound inside one method, bucketed by how they are bound.
///
/// Each bucket is deduplicated and keeps first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariables {
    /// Declared parameters; variadic ones carry `*` / `**` prefixes.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Targets of plain and annotated assignments.
    #[serde(default)]
    pub assigned: Vec<String>,
    /// Names bound by `for` targets.
    #[serde(default)]
    pub loop_vars: Vec<String>,
    /// Names bound by `with ... as` items.
    #[serde(default)]
    pub scoped_vars: Vec<String>,
}

impl LocalVariables {
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
            && self.assigned.is_empty()
            && self.loop_vars.is_empty()
            && self.scoped_vars.is_empty()
    }
}

/// A method (or module-level function) in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    /// Display signature, e.g. `move(self, x, y)`.
    pub signature: String,
    pub lines: LineRange,
    /// Raw source of the declaration, `lines.start..=lines.end`.
    pub code: String,
    /// Cleaned docstring, empty when absent.
    #[serde(default)]
    pub docstring: String,
    #[serde(default)]
    pub local_vars: LocalVariables,
}

impl MethodRecord {
    pub fn has_docstring(&self) -> bool {
        !self.docstring.is_empty()
    }
}

/// A top-level class in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Project-unique key, `<module>.<ClassName>`.
    pub key: String,
    pub name: String,
    /// Root-relative path of the declaring file.
    pub file: String,
    /// Line of the `class` keyword.
    pub lineno: usize,
    /// Cleaned docstring, empty when absent.
    #[serde(default)]
    pub docstring: String,
    /// Methods in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodRecord>,
    /// Method name -> instance variables it assigns through the receiver.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub instance_variables_by_method: IndexMap<String, Vec<String>>,
}

impl ClassRecord {
    /// All instance variables of the class, first-seen order.
    pub fn instance_variables(&self) -> Vec<String> {
        let mut all = Vec::new();
        for vars in self.instance_variables_by_method.values() {
            for var in vars {
                if !all.contains(var) {
                    all.push(var.clone());
                }
            }
        }
        all
    }
}

/// Per-file entry of the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub lines: usize,
    /// Keys of the classes declared in this file, declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_keys: Vec<String>,
    /// Module-level functions, declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<MethodRecord>,
}

/// Aggregate counters of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_classes: usize,
    pub total_methods: usize,
}

/// The complete structural model of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectModel {
    pub project_name: String,
    pub project_path: String,
    pub analyzed_at: DateTime<Utc>,
    pub stats: ProjectStats,
    #[serde(default)]
    pub classes: IndexMap<String, ClassRecord>,
    /// Analyzed files, scan order.
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub files_data: IndexMap<String, SourceFile>,
    /// Root module names of every import.
    #[serde(default)]
    pub imports: BTreeSet<String>,
    /// Names of module-level functions, scan order.
    #[serde(default)]
    pub global_functions: Vec<String>,
}

impl ProjectModel {
    /// Look up a class by key.
    pub fn class(&self, key: &str) -> Option<&ClassRecord> {
        self.classes.get(key)
    }

    /// Classes declared in `file`, declaration order.
    pub fn classes_in_file<'a>(&'a self, file: &str) -> impl Iterator<Item = &'a ClassRecord> + 'a {
        self.files_data
            .get(file)
            .into_iter()
            .flat_map(|f| f.class_keys.iter())
            .filter_map(move |key| self.classes.get(key))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON text.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the model to a JSON file.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)
            .map_err(|e| anyhow::anyhow!("writing model to {}: {}", path.display(), e))
    }

    /// Read a model previously written with [`ProjectModel::write_json`].
    pub fn read_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading model {}: {}", path.display(), e))?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_range_clamps() {
        let r = LineRange::new(10, 4);
        assert_eq!(r.end, 10);
        assert_eq!(r.len(), 1);
        assert_eq!(LineRange::new(3, 7).len(), 5);
        assert!(!r.is_empty());
    }

    #[test]
    fn test_instance_variables_dedup() {
        let mut by_method = IndexMap::new();
        by_method.insert("__init__".to_string(), vec!["a".to_string(), "b".to_string()]);
        by_method.insert("reset".to_string(), vec!["b".to_string(), "c".to_string()]);
        let class = ClassRecord {
            key: "m.C".to_string(),
            name: "C".to_string(),
            file: "m.py".to_string(),
            lineno: 1,
            docstring: String::new(),
            methods: vec![],
            instance_variables_by_method: by_method,
        };
        assert_eq!(class.instance_variables(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_collections_are_omitted() {
        let file = SourceFile {
            lines: 3,
            class_keys: vec![],
            functions: vec![],
        };
        let json = serde_json::to_string(&file).unwrap();
        assert_eq!(json, r#"{"lines":3}"#);
        let back: SourceFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn test_inverted_line_range_is_rejected() {
        let ok: LineRange = serde_json::from_str(r#"{"start":2,"end":2}"#).unwrap();
        assert_eq!(ok.len(), 1);
        assert!(serde_json::from_str::<LineRange>(r#"{"start":2,"end":0}"#).is_err());

        let method = MethodRecord {
            name: "f".to_string(),
            signature: "f()".to_string(),
            lines: LineRange::new(1, 2),
            code: "def f():\n    pass".to_string(),
            docstring: String::new(),
            local_vars: LocalVariables::default(),
        };
        let mut files_data = IndexMap::new();
        files_data.insert(
            "m.py".to_string(),
            SourceFile {
                lines: 3,
                class_keys: vec![],
                functions: vec![method],
            },
        );
        let model = ProjectModel {
            project_name: "p".to_string(),
            project_path: "/p".to_string(),
            analyzed_at: Utc::now(),
            stats: ProjectStats::default(),
            classes: IndexMap::new(),
            files: vec!["m.py".to_string()],
            files_data,
            imports: BTreeSet::new(),
            global_functions: vec!["f".to_string()],
        };

        let json = model.to_json().unwrap();
        assert!(ProjectModel::from_json(&json).is_ok());

        let broken = json.replace("\"end\": 2", "\"end\": 0");
        assert_ne!(broken, json);
        assert!(ProjectModel::from_json(&broken).is_err());
    }
}
