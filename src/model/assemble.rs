//! Second phase: join per-file collections into one [`ProjectModel`].

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::{ClassRecord, MethodRecord, ProjectModel, ProjectStats, SourceFile};
use crate::analysis::{CollectedMethod, FileCollection, MethodKey, MODULE_OWNER};

/// Build the model from per-file collections, in the given file order.
///
/// No syntax tree is touched here. A method whose local-variable facts are
/// missing gets empty buckets.
pub fn assemble(
    project_name: &str,
    project_path: &str,
    analyzed_at: DateTime<Utc>,
    collections: Vec<FileCollection>,
) -> ProjectModel {
    let mut model = ProjectModel {
        project_name: project_name.to_string(),
        project_path: project_path.to_string(),
        analyzed_at,
        stats: ProjectStats::default(),
        classes: IndexMap::new(),
        files: Vec::with_capacity(collections.len()),
        files_data: IndexMap::new(),
        imports: Default::default(),
        global_functions: Vec::new(),
    };

    for mut collection in collections {
        let mut class_keys = Vec::with_capacity(collection.classes.len());

        for class in std::mem::take(&mut collection.classes) {
            let methods = class
                .methods
                .into_iter()
                .map(|m| method_record(m, &class.key, &mut collection))
                .collect::<Vec<_>>();

            let mut key = class.key;
            if model.classes.contains_key(&key) {
                tracing::warn!("duplicate class key {} in {}", key, collection.path);
                key = format!("{}@{}", key, collection.path);
            }

            model.stats.total_methods += methods.len();
            class_keys.push(key.clone());
            model.classes.insert(
                key.clone(),
                ClassRecord {
                    key,
                    name: class.name,
                    file: collection.path.clone(),
                    lineno: class.line,
                    docstring: class.docstring,
                    methods,
                    instance_variables_by_method: class.instance_vars,
                },
            );
        }

        let functions = std::mem::take(&mut collection.functions)
            .into_iter()
            .map(|f| method_record(f, MODULE_OWNER, &mut collection))
            .collect::<Vec<_>>();
        model
            .global_functions
            .extend(functions.iter().map(|f| f.name.clone()));

        model.imports.extend(std::mem::take(&mut collection.imports));
        model.stats.total_lines += collection.line_count;
        model.files.push(collection.path.clone());
        model.files_data.insert(
            collection.path,
            SourceFile {
                lines: collection.line_count,
                class_keys,
                functions,
            },
        );
    }

    model.stats.total_files = model.files.len();
    model.stats.total_classes = model.classes.len();
    model
}

fn method_record(method: CollectedMethod, owner: &str, collection: &mut FileCollection) -> MethodRecord {
    let key = MethodKey::new(owner, &method.name, method.span.start_line);
    let local_vars = collection.local_vars.remove(&key).unwrap_or_else(|| {
        tracing::debug!(
            "no variable facts for {}.{} in {}, using empty buckets",
            owner,
            method.name,
            collection.path
        );
        Default::default()
    });

    MethodRecord {
        lines: method.span.lines(),
        name: method.name,
        signature: method.signature,
        code: method.code,
        docstring: method.docstring,
        local_vars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{CollectedClass, Span};
    use crate::model::LocalVariables;

    fn method(name: &str, start: usize, end: usize) -> CollectedMethod {
        CollectedMethod {
            name: name.to_string(),
            signature: format!("{}(self)", name),
            span: Span {
                start_line: start,
                end_line: end,
            },
            code: String::new(),
            docstring: String::new(),
            parameters: vec![],
        }
    }

    fn collection(path: &str, class_key: &str) -> FileCollection {
        let mut c = FileCollection {
            path: path.to_string(),
            line_count: 10,
            ..Default::default()
        };
        c.classes.push(CollectedClass {
            key: class_key.to_string(),
            name: class_key.rsplit('.').next().unwrap().to_string(),
            line: 1,
            docstring: String::new(),
            methods: vec![method("a", 2, 4), method("b", 5, 9)],
            instance_vars: IndexMap::new(),
        });
        c.functions.push(method("helper", 10, 10));
        c.imports.insert("os".to_string());
        c
    }

    #[test]
    fn test_assemble_joins_files() {
        let mut first = collection("a.py", "a.Alpha");
        first.local_vars.insert(
            MethodKey::new("a.Alpha", "a", 2),
            LocalVariables {
                parameters: vec!["self".to_string()],
                ..Default::default()
            },
        );
        let second = collection("pkg/b.py", "b.Beta");

        let model = assemble("proj", "/tmp/proj", Utc::now(), vec![first, second]);

        assert_eq!(model.files, vec!["a.py", "pkg/b.py"]);
        assert_eq!(model.stats.total_files, 2);
        assert_eq!(model.stats.total_lines, 20);
        assert_eq!(model.stats.total_classes, 2);
        assert_eq!(model.stats.total_methods, 4);
        assert_eq!(model.global_functions, vec!["helper", "helper"]);
        assert_eq!(model.imports.len(), 1);

        let alpha = model.class("a.Alpha").unwrap();
        assert_eq!(alpha.file, "a.py");
        assert_eq!(alpha.methods[0].local_vars.parameters, vec!["self"]);
        // Missing facts fall back to empty buckets.
        assert!(alpha.methods[1].local_vars.is_empty());

        let data = &model.files_data["pkg/b.py"];
        assert_eq!(data.class_keys, vec!["b.Beta"]);
        assert_eq!(data.functions[0].lines.start, 10);
    }

    #[test]
    fn test_assemble_empty() {
        let model = assemble("empty", "/tmp/empty", Utc::now(), vec![]);
        assert_eq!(model.stats, ProjectStats::default());
        assert!(model.classes.is_empty());
    }
}
