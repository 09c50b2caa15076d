//! Binding targets of assignments, loops and `with` items.
//!
//! A target node is lowered into a small tree so the destructuring rules
//! can be applied without re-walking the syntax tree.

use tree_sitter::Node;

use super::ParsedFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A bare name.
    Name(String),
    /// Tuple or list destructuring.
    Compound(Vec<Target>),
    /// `*rest`
    Starred(Box<Target>),
    /// `owner.attr`
    Attribute { owner: Box<Target>, attr: String },
    /// `base[...]`
    Subscript(Box<Target>),
    /// Anything that binds no name.
    Other,
}

impl Target {
    /// Lower a target node.
    pub fn from_node(node: Node, parsed: &ParsedFile) -> Target {
        match node.kind() {
            "identifier" | "keyword_identifier" => Target::Name(parsed.node_text(node).to_string()),
            "tuple" | "tuple_pattern" | "list" | "list_pattern" | "pattern_list"
            | "expression_list" => {
                let mut cursor = node.walk();
                let items = node
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .map(|n| Target::from_node(n, parsed))
                    .collect();
                Target::Compound(items)
            }
            "parenthesized_expression" | "as_pattern_target" => match first_named(node) {
                Some(inner) => Target::from_node(inner, parsed),
                None => Target::Other,
            },
            "list_splat_pattern" | "list_splat" => match first_named(node) {
                Some(inner) => Target::Starred(Box::new(Target::from_node(inner, parsed))),
                None => Target::Other,
            },
            "attribute" => {
                let owner = node.child_by_field_name("object");
                let attr = node.child_by_field_name("attribute");
                match (owner, attr) {
                    (Some(owner), Some(attr)) => Target::Attribute {
                        owner: Box::new(Target::from_node(owner, parsed)),
                        attr: parsed.node_text(attr).to_string(),
                    },
                    _ => Target::Other,
                }
            }
            "subscript" => match node.child_by_field_name("value") {
                Some(base) => Target::Subscript(Box::new(Target::from_node(base, parsed))),
                None => Target::Other,
            },
            _ => Target::Other,
        }
    }

    /// Every name this target binds, in source order.
    ///
    /// Compound targets are flattened, starred targets yield the starred
    /// name, attribute chains yield their dotted form and subscripts yield
    /// the name of the subscripted value.
    pub fn names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.push_names(None, &mut out);
        out
    }

    /// Like [`Target::names`], minus anything reached through `receiver`.
    pub fn names_excluding(&self, receiver: Option<&str>) -> Vec<String> {
        let mut out = Vec::new();
        self.push_names(receiver, &mut out);
        out
    }

    fn push_names(&self, receiver: Option<&str>, out: &mut Vec<String>) {
        match self {
            Target::Name(name) => out.push(name.clone()),
            Target::Compound(items) => {
                for item in items {
                    item.push_names(receiver, out);
                }
            }
            Target::Starred(inner) => inner.push_names(receiver, out),
            Target::Attribute { owner, attr } => {
                if receiver.is_some_and(|r| self.is_rooted_at(r)) {
                    return;
                }
                let mut owners = Vec::new();
                owner.push_names(receiver, &mut owners);
                out.extend(owners.into_iter().map(|o| format!("{}.{}", o, attr)));
            }
            Target::Subscript(base) => base.push_names(receiver, out),
            Target::Other => {}
        }
    }

    /// Whether this is an access path starting at the name `root`.
    fn is_rooted_at(&self, root: &str) -> bool {
        match self {
            Target::Name(name) => name == root,
            Target::Attribute { owner, .. } => owner.is_rooted_at(root),
            Target::Subscript(base) => base.is_rooted_at(root),
            _ => false,
        }
    }

    /// Attributes assigned directly on `receiver`, e.g. `x` for `self.x`.
    ///
    /// Looks through compound and starred targets; deeper chains and
    /// subscripted attributes are not instance variables.
    pub fn receiver_attributes(&self, receiver: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.push_receiver_attributes(receiver, &mut out);
        out
    }

    fn push_receiver_attributes(&self, receiver: &str, out: &mut Vec<String>) {
        match self {
            Target::Attribute { owner, attr } => {
                if matches!(owner.as_ref(), Target::Name(n) if n == receiver) {
                    out.push(attr.clone());
                }
            }
            Target::Compound(items) => {
                for item in items {
                    item.push_receiver_attributes(receiver, out);
                }
            }
            Target::Starred(inner) => inner.push_receiver_attributes(receiver, out),
            _ => {}
        }
    }
}

fn first_named(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let first = node
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment");
    first
}
