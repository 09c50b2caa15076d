//! Python source collector using tree-sitter.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, QueryError};

use super::{
    variables, CollectUnit, CollectedClass, CollectedMethod, FileCollection, MethodKey, Parameter, ParsedFile,
    SourceCollector, Span, MODULE_OWNER,
};
use crate::error::CollectError;
use crate::model::{LineRange, LocalVariables};

/// Tree-sitter query for extracting imports.
const IMPORT_QUERY_SOURCE: &str = r#"
; import module
(import_statement
  name: (dotted_name) @module
)

; import module as alias
(import_statement
  name: (aliased_import
    name: (dotted_name) @module
  )
)

; from module import name
(import_from_statement
  module_name: (dotted_name) @module
)

; from .module import name
(import_from_statement
  module_name: (relative_import) @relative
)
"#;

lazy_static! {
    /// Compiled once and shared by every collector.
    static ref IMPORT_QUERY: Result<Query, QueryError> = Query::new(
        &Language::from(tree_sitter_python::LANGUAGE),
        IMPORT_QUERY_SOURCE,
    );
}

/// Python 2 statements tree-sitter still accepts.
const PYTHON2_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct PythonCollector {
    language: Language,
    receiver: String,
}

impl PythonCollector {
    /// Create a collector that treats `receiver` as the instance receiver.
    pub fn new(receiver: impl Into<String>) -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
            receiver: receiver.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, CollectError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| CollectError::Parser(e.to_string()))?;
        Ok(parser)
    }

    fn extract_imports(&self, parsed: &ParsedFile) -> Result<BTreeSet<String>, CollectError> {
        let query = IMPORT_QUERY
            .as_ref()
            .map_err(|e| CollectError::Parser(e.to_string()))?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, parsed.tree.root_node(), &parsed.source[..]);

        let mut imports = BTreeSet::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let text = parsed.node_text(capture.node);
                // `from .pkg import x` names `pkg`; `from . import x` names nothing.
                let module = match query.capture_names()[capture.index as usize] {
                    "relative" => text.trim_start_matches('.'),
                    _ => text,
                };
                if let Some(root) = root_module(module) {
                    imports.insert(root.to_string());
                }
            }
        }

        Ok(imports)
    }

    fn collect_class(
        &self,
        class: Node,
        parsed: &ParsedFile,
        lines: &[&str],
        unit: &CollectUnit,
        collection: &mut FileCollection,
    ) -> CollectedClass {
        let name = field_text(class, "name", parsed);
        let line = class.start_position().row + 1;

        let mut key = format!("{}.{}", unit.key_prefix, name);
        if collection.classes.iter().any(|c| c.key == key) {
            key = format!("{}@{}", key, line);
        }

        let body = class.child_by_field_name("body");
        let docstring = body.map(|b| docstring(b, parsed)).unwrap_or_default();

        let mut methods = Vec::new();
        let mut instance_vars: IndexMap<String, Vec<String>> = IndexMap::new();

        if let Some(body) = body {
            let mut cursor = body.walk();
            let defs: Vec<Node> = body
                .named_children(&mut cursor)
                .filter_map(definition)
                .filter(|n| n.kind() == "function_definition")
                .collect();

            for def in defs {
                let (method, locals) = self.collect_function(def, parsed, lines, Some(self.receiver.as_str()));
                collection
                    .local_vars
                    .insert(MethodKey::new(&key, &method.name, method.span.start_line), locals);

                let assigned = variables::instance_variables(def, parsed, &self.receiver);
                if !assigned.is_empty() {
                    let entry = instance_vars.entry(method.name.clone()).or_default();
                    for var in assigned {
                        if !entry.contains(&var) {
                            entry.push(var);
                        }
                    }
                }

                methods.push(method);
            }
        }

        CollectedClass {
            key,
            name,
            line,
            docstring,
            methods,
            instance_vars,
        }
    }

    fn collect_function(
        &self,
        def: Node,
        parsed: &ParsedFile,
        lines: &[&str],
        receiver: Option<&str>,
    ) -> (CollectedMethod, LocalVariables) {
        let name = field_text(def, "name", parsed);
        let parameters = variables::parameters(def, parsed);
        let mut span = Span::from_node(def);
        span.end_line = span.end_line.min(lines.len()).max(span.start_line);

        let (docstring, locals) = match def.child_by_field_name("body") {
            Some(body) => (
                docstring(body, parsed),
                variables::local_variables(&parameters, body, parsed, receiver),
            ),
            None => (
                String::new(),
                variables::local_variables(&parameters, def, parsed, receiver),
            ),
        };

        let method = CollectedMethod {
            signature: signature_text(&name, &parameters),
            code: slice_lines(lines, span.lines()),
            name,
            span,
            docstring,
            parameters,
        };
        (method, locals)
    }
}

impl Default for PythonCollector {
    fn default() -> Self {
        Self::new("self")
    }
}

impl SourceCollector for PythonCollector {
    fn parse(&self, rel_path: &str, mut source: Vec<u8>) -> Result<ParsedFile, CollectError> {
        if source.starts_with(UTF8_BOM) {
            source.drain(..UTF8_BOM.len());
        }
        if std::str::from_utf8(&source).is_err() {
            return Err(CollectError::InvalidUtf8);
        }

        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| CollectError::Parser("parser produced no tree".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(CollectError::SyntaxInvalid {
                line: first_error_line(root),
            });
        }
        if let Some(stmt) = variables::preorder(root)
            .into_iter()
            .find(|n| PYTHON2_STATEMENTS.contains(&n.kind()))
        {
            return Err(CollectError::SyntaxInvalid {
                line: stmt.start_position().row + 1,
            });
        }

        Ok(ParsedFile {
            tree,
            source,
            path: rel_path.to_string(),
        })
    }

    fn collect(&self, parsed: &ParsedFile, unit: &CollectUnit) -> Result<FileCollection, CollectError> {
        let source = parsed.source_str();
        let lines: Vec<&str> = source
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();

        let mut collection = FileCollection {
            path: unit.rel_path.to_string(),
            line_count: source.matches('\n').count() + 1,
            imports: self.extract_imports(parsed)?,
            ..Default::default()
        };

        let root = parsed.tree.root_node();
        let mut cursor = root.walk();
        let top_level: Vec<Node> = root.named_children(&mut cursor).collect();

        for node in top_level {
            if node.kind() == "future_import_statement" {
                collection.imports.insert("__future__".to_string());
                continue;
            }
            let Some(def) = definition(node) else {
                continue;
            };
            match def.kind() {
                "class_definition" => {
                    let class = self.collect_class(def, parsed, &lines, unit, &mut collection);
                    collection.classes.push(class);
                }
                "function_definition" => {
                    let (function, locals) = self.collect_function(def, parsed, &lines, None);
                    collection.local_vars.insert(
                        MethodKey::new(MODULE_OWNER, &function.name, function.span.start_line),
                        locals,
                    );
                    collection.functions.push(function);
                }
                _ => {}
            }
        }

        tracing::debug!(
            "{}: {} classes, {} methods, {} functions",
            collection.path,
            collection.classes.len(),
            collection.method_count(),
            collection.functions.len()
        );

        Ok(collection)
    }
}

/// Unwrap decorators; `None` for anything that is not a definition.
fn definition(node: Node) -> Option<Node> {
    match node.kind() {
        "class_definition" | "function_definition" => Some(node),
        "decorated_definition" => node.child_by_field_name("definition"),
        _ => None,
    }
}

fn field_text(node: Node, field: &str, parsed: &ParsedFile) -> String {
    node.child_by_field_name(field)
        .map(|n| parsed.node_text(n).to_string())
        .unwrap_or_default()
}

fn root_module(module: &str) -> Option<&str> {
    module.split('.').next().map(str::trim).filter(|s| !s.is_empty())
}

fn first_error_line(root: Node) -> usize {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_position().row + 1;
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    root.start_position().row + 1
}

/// `name(a, b, c)` over the non-variadic parameters.
pub fn signature_text(name: &str, params: &[Parameter]) -> String {
    let names: Vec<&str> = params
        .iter()
        .filter(|p| !p.is_variadic())
        .map(|p| p.name.as_str())
        .collect();
    format!("{}({})", name, names.join(", "))
}

fn slice_lines(lines: &[&str], range: LineRange) -> String {
    let start = range.start.saturating_sub(1).min(lines.len());
    let end = range.end.min(lines.len()).max(start);
    lines[start..end].join("\n")
}

/// Cleaned docstring of a class or function body, empty when absent.
pub fn docstring(body: Node, parsed: &ParsedFile) -> String {
    let mut cursor = body.walk();
    let first = body.named_children(&mut cursor).find(|n| n.kind() != "comment");
    let Some(stmt) = first else {
        return String::new();
    };
    if stmt.kind() != "expression_statement" || stmt.named_child_count() != 1 {
        return String::new();
    }
    let Some(mut expr) = stmt.named_child(0) else {
        return String::new();
    };
    // `("a" "b")` is still a string constant.
    while expr.kind() == "parenthesized_expression" {
        let mut cursor = expr.walk();
        let inner = expr.named_children(&mut cursor).find(|n| n.kind() != "comment");
        match inner {
            Some(inner) => expr = inner,
            None => return String::new(),
        }
    }

    let raw = match expr.kind() {
        "string" => string_value(parsed.node_text(expr)),
        "concatenated_string" => {
            let mut cursor = expr.walk();
            let parts: Option<Vec<String>> = expr
                .named_children(&mut cursor)
                .filter(|n| n.kind() == "string")
                .map(|n| string_value(parsed.node_text(n)))
                .collect();
            parts.map(|p| p.concat())
        }
        _ => None,
    };

    raw.map(|r| clean_docstring(&r)).unwrap_or_default()
}

/// Contents of a string literal without prefix and quotes.
///
/// Bytes and f-strings are not docstrings and yield `None`.
fn string_value(literal: &str) -> Option<String> {
    let quote_at = literal.find(|c| c == '"' || c == '\'')?;
    let prefix = literal[..quote_at].to_ascii_lowercase();
    if prefix.contains('b') || prefix.contains('f') {
        return None;
    }
    let quoted = &literal[quote_at..];
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if quoted.len() >= 2 * quote.len() && quoted.starts_with(quote) && quoted.ends_with(quote) {
            return Some(quoted[quote.len()..quoted.len() - quote.len()].to_string());
        }
    }
    None
}

/// Normalize docstring indentation.
///
/// Tabs expand to 8 columns, the first line is left-stripped, the common
/// indentation of the remaining lines is removed and blank lines at both
/// ends are dropped. `\r\n` and lone `\r` count as newlines.
pub fn clean_docstring(raw: &str) -> String {
    let raw = raw.replace("\r\n", "\n").replace('\r', "\n");
    let expanded: Vec<String> = raw.split('\n').map(expand_tabs).collect();

    let margin = expanded
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut lines: Vec<String> = Vec::with_capacity(expanded.len());
    for (i, line) in expanded.iter().enumerate() {
        if i == 0 {
            lines.push(line.trim_start().to_string());
        } else {
            lines.push(line.chars().skip(margin).collect());
        }
    }

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                let pad = 8 - column % 8;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(source: &str) -> FileCollection {
        let collector = PythonCollector::default();
        let parsed = collector.parse("pkg/mod.py", source.as_bytes().to_vec()).unwrap();
        let unit = CollectUnit {
            rel_path: "pkg/mod.py",
            key_prefix: "mod",
        };
        collector.collect(&parsed, &unit).unwrap()
    }

    #[test]
    fn test_class_and_methods() {
        let source = r#"import os

class Shape:
    """A shape."""

    def __init__(self, name, *args, **kwargs):
        self.name = name
        self.sides = 0

    @property
    def area(self):
        return 0

    async def load(self, path):
        pass
"#;
        let c = collect(source);
        assert_eq!(c.line_count, 16);
        assert_eq!(c.classes.len(), 1);

        let shape = &c.classes[0];
        assert_eq!(shape.key, "mod.Shape");
        assert_eq!(shape.line, 3);
        assert_eq!(shape.docstring, "A shape.");

        let names: Vec<&str> = shape.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["__init__", "area", "load"]);

        let init = &shape.methods[0];
        assert_eq!(init.signature, "__init__(self, name)");
        assert_eq!(init.span.start_line, 6);
        assert_eq!(init.span.end_line, 8);
        assert!(init.code.starts_with("    def __init__"));
        assert!(init.code.ends_with("self.sides = 0"));

        // Decorators are not part of the declared range.
        assert_eq!(shape.methods[1].span.start_line, 11);

        assert_eq!(shape.instance_vars.get("__init__").unwrap(), &vec!["name", "sides"]);
        assert!(!shape.instance_vars.contains_key("area"));

        let locals = c.local_vars.get(&MethodKey::new("mod.Shape", "__init__", 6)).unwrap();
        assert_eq!(locals.parameters, vec!["self", "name", "*args", "**kwargs"]);
        assert!(locals.assigned.is_empty());
    }

    #[test]
    fn test_nested_classes_are_not_top_level() {
        let source = "class Outer:\n    class Inner:\n        def m(self):\n            pass\n\n    def run(self):\n        pass\n";
        let c = collect(source);
        assert_eq!(c.classes.len(), 1);
        let names: Vec<&str> = c.classes[0].methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["run"]);
    }

    #[test]
    fn test_duplicate_class_names_get_line_suffix() {
        let c = collect("class A:\n    pass\n\nclass A:\n    pass\n");
        let keys: Vec<&str> = c.classes.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["mod.A", "mod.A@4"]);
    }

    #[test]
    fn test_module_functions() {
        let c = collect("@cache\ndef helper(x, y=2):\n    \"\"\"Help.\"\"\"\n    total = x + y\n    return total\n");
        assert!(c.classes.is_empty());
        assert_eq!(c.global_functions().collect::<Vec<_>>(), vec!["helper"]);
        let helper = &c.functions[0];
        assert_eq!(helper.signature, "helper(x, y)");
        assert_eq!(helper.docstring, "Help.");
        assert_eq!(helper.span.start_line, 2);
        let locals = c.local_vars.get(&MethodKey::new(MODULE_OWNER, "helper", 2)).unwrap();
        assert_eq!(locals.assigned, vec!["total"]);
    }

    #[test]
    fn test_imports() {
        let source = r#"from __future__ import annotations
import os.path
import numpy as np
from collections.abc import Mapping
from .sibling import thing
from . import other

def late():
    import json
"#;
        let c = collect(source);
        let imports: Vec<&str> = c.imports.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            imports,
            vec!["__future__", "collections", "json", "numpy", "os", "sibling"]
        );
    }

    #[test]
    fn test_syntax_error_is_rejected() {
        let collector = PythonCollector::default();
        let err = collector
            .parse("bad.py", b"def ok():\n    pass\n\ndef broken(:\n".to_vec())
            .err()
            .unwrap();
        assert!(matches!(err, CollectError::SyntaxInvalid { .. }));
    }

    #[test]
    fn test_python2_statements_are_rejected() {
        let collector = PythonCollector::default();
        let err = collector
            .parse("old.py", b"class A:\n    def f(self):\n        print \"hi\"\n".to_vec())
            .err()
            .unwrap();
        assert!(matches!(err, CollectError::SyntaxInvalid { line: 3 }));

        let err = collector.parse("old.py", b"exec \"x = 1\"\n".to_vec()).err().unwrap();
        assert!(matches!(err, CollectError::SyntaxInvalid { line: 1 }));

        // Calls to the builtins are fine.
        assert!(collector
            .parse("new.py", b"print(\"hi\")\nexec(\"x = 1\")\n".to_vec())
            .is_ok());
    }

    #[test]
    fn test_import_query_compiles() {
        let query = IMPORT_QUERY.as_ref().unwrap();
        assert_eq!(query.pattern_count(), 4);
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let collector = PythonCollector::default();
        let err = collector.parse("bin.py", vec![0x66, 0xff, 0xfe, 0x0a]).err().unwrap();
        assert!(matches!(err, CollectError::InvalidUtf8));
    }

    #[test]
    fn test_docstring_forms() {
        let c = collect(
            "def a():\n    # note\n    r'''Raw\n\n       indented\n    '''\n\ndef b():\n    x = 1\n    \"\"\"late\"\"\"\n\ndef c():\n    f\"no {x}\"\n\ndef d():\n    \"one \" \"two\"\n",
        );
        let docs: Vec<&str> = c.functions.iter().map(|f| f.docstring.as_str()).collect();
        assert_eq!(docs, vec!["Raw\n\nindented", "", "", "one two"]);
    }

    #[test]
    fn test_crlf_docstring() {
        let c = collect(
            "class A:\r\n    def f(self):\r\n        \"\"\"Doc.\r\n\r\n        more\r\n        \"\"\"\r\n        return 1\r\n",
        );
        let f = &c.classes[0].methods[0];
        assert_eq!(f.docstring, "Doc.\n\nmore");
        assert!(!f.code.contains('\r'));
    }

    #[test]
    fn test_parenthesized_docstring() {
        let c = collect("def a():\n    (\"a\"\n     \"b\")\n\ndef b():\n    (\"only\")\n\ndef c():\n    (x)\n");
        let docs: Vec<&str> = c.functions.iter().map(|f| f.docstring.as_str()).collect();
        assert_eq!(docs, vec!["ab", "only", ""]);
    }

    #[test]
    fn test_clean_docstring() {
        assert_eq!(clean_docstring("  Summary.\n\n    Body\n      more\n    "), "Summary.\n\nBody\n  more");
        assert_eq!(clean_docstring("\n\n  Only body\n"), "Only body");
        assert_eq!(clean_docstring(""), "");
        assert_eq!(clean_docstring("a\n\tb"), "a\nb");
        assert_eq!(clean_docstring("Doc.\r\n\r\n    more\r\n    "), "Doc.\n\nmore");
        assert_eq!(clean_docstring("a\rb"), "a\nb");
    }

    #[test]
    fn test_string_value() {
        assert_eq!(string_value("\"x\"").as_deref(), Some("x"));
        assert_eq!(string_value("u'x'").as_deref(), Some("x"));
        assert_eq!(string_value("R\"\"\"x\"\"\"").as_deref(), Some("x"));
        assert_eq!(string_value("b'x'"), None);
        assert_eq!(string_value("rb'x'"), None);
        assert_eq!(string_value("F'x'"), None);
    }

    #[test]
    fn test_signature_text() {
        let params = vec![
            Parameter::named("self"),
            Parameter {
                name: "rest".to_string(),
                kind: crate::analysis::ParameterKind::VarPositional,
            },
            Parameter::named("key"),
        ];
        assert_eq!(signature_text("run", &params), "run(self, key)");
        assert_eq!(signature_text("noop", &[]), "noop()");
    }
}
