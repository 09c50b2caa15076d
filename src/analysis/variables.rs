//! Parameter and variable extraction for function definitions.

use tree_sitter::Node;

use super::{Parameter, ParameterKind, ParsedFile, Target};
use crate::model::LocalVariables;

/// Declared parameters of a `function_definition`, in order.
///
/// Separators (`*`, `/`) bind nothing and are dropped.
pub fn parameters(func: Node, parsed: &ParsedFile) -> Vec<Parameter> {
    let Some(params) = func.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter_map(|node| parameter(node, parsed))
        .collect()
}

fn parameter(node: Node, parsed: &ParsedFile) -> Option<Parameter> {
    match node.kind() {
        "identifier" => Some(Parameter::named(parsed.node_text(node))),
        "list_splat_pattern" => splat(node, ParameterKind::VarPositional, parsed),
        "dictionary_splat_pattern" => splat(node, ParameterKind::VarKeyword, parsed),
        "default_parameter" | "typed_default_parameter" => {
            let name = node.child_by_field_name("name")?;
            parameter(name, parsed)
        }
        "typed_parameter" => {
            // The annotated name is the first named child; `type` is a field.
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next()?;
            parameter(inner, parsed)
        }
        _ => None,
    }
}

fn splat(node: Node, kind: ParameterKind, parsed: &ParsedFile) -> Option<Parameter> {
    let mut cursor = node.walk();
    let name = node
        .named_children(&mut cursor)
        .find(|n| n.kind() == "identifier")?;
    Some(Parameter {
        name: parsed.node_text(name).to_string(),
        kind,
    })
}

/// Local-variable buckets of a function.
///
/// `receiver` is the instance receiver for methods and `None` for
/// module-level functions.
pub fn local_variables(
    params: &[Parameter],
    body: Node,
    parsed: &ParsedFile,
    receiver: Option<&str>,
) -> LocalVariables {
    let mut vars = LocalVariables::default();
    for param in params {
        push_unique(&mut vars.parameters, param.to_string());
    }

    for node in preorder(body) {
        match node.kind() {
            "assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    for name in Target::from_node(left, parsed).names_excluding(receiver) {
                        push_unique(&mut vars.assigned, name);
                    }
                }
            }
            "for_statement" => {
                if let Some(left) = node.child_by_field_name("left") {
                    for name in Target::from_node(left, parsed).names() {
                        push_unique(&mut vars.loop_vars, name);
                    }
                }
            }
            "with_item" => {
                if let Some(alias) = with_alias(node) {
                    for name in Target::from_node(alias, parsed).names() {
                        push_unique(&mut vars.scoped_vars, name);
                    }
                }
            }
            _ => {}
        }
    }

    vars
}

/// Attributes assigned through `receiver` anywhere inside `func`.
pub fn instance_variables(func: Node, parsed: &ParsedFile, receiver: &str) -> Vec<String> {
    let mut vars = Vec::new();
    for node in preorder(func) {
        if node.kind() != "assignment" {
            continue;
        }
        if let Some(left) = node.child_by_field_name("left") {
            for attr in Target::from_node(left, parsed).receiver_attributes(receiver) {
                push_unique(&mut vars, attr);
            }
        }
    }
    vars
}

/// Bound target of `with expr as target`.
fn with_alias(item: Node) -> Option<Node> {
    let value = item.child_by_field_name("value")?;
    if value.kind() != "as_pattern" {
        return None;
    }
    value.child_by_field_name("alias")
}

/// Named nodes under `root` (inclusive) in source order.
pub(crate) fn preorder(root: Node) -> Vec<Node> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        out.push(node);
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

fn push_unique(bucket: &mut Vec<String>, name: String) {
    if !bucket.contains(&name) {
        bucket.push(name);
    }
}
