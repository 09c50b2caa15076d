//! Facts collected from a single source file.
//!
//! These are the per-file results of the collection phase. They carry no
//! cross-file information except the class-key prefix handed in by the
//! caller; the model assembler stitches them together.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use indexmap::IndexMap;

use crate::model::{LineRange, LocalVariables};

/// Source location of a node, 1-indexed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    ///
    /// A node that ends at column 0 owns the trailing newline of its last
    /// line only; that next row is not part of the span.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        let end_line = if end.column == 0 && end.row > start.row {
            end.row
        } else {
            end.row + 1 // tree-sitter is 0-indexed
        };
        Self {
            start_line: start.row + 1,
            end_line,
        }
    }

    pub fn lines(&self) -> LineRange {
        LineRange::new(self.start_line, self.end_line)
    }
}

/// How a parameter binds its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Ordinary positional or keyword parameter.
    Named,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Named,
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.kind != ParameterKind::Named
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParameterKind::Named => write!(f, "{}", self.name),
            ParameterKind::VarPositional => write!(f, "*{}", self.name),
            ParameterKind::VarKeyword => write!(f, "**{}", self.name),
        }
    }
}

/// Identifies a method inside one file for the local-variable table.
///
/// The declaration line disambiguates same-named methods (property
/// getters and setters, conditional redefinitions).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    /// Class key, or [`MODULE_OWNER`] for module-level functions.
    pub owner: String,
    pub name: String,
    pub line: usize,
}

/// Owner used in [`MethodKey`] for module-level functions.
pub const MODULE_OWNER: &str = "<module>";

impl MethodKey {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, line: usize) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            line,
        }
    }
}

/// A method or function as collected, before local variables are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedMethod {
    pub name: String,
    pub signature: String,
    pub span: Span,
    pub code: String,
    pub docstring: String,
    pub parameters: Vec<Parameter>,
}

/// A top-level class as collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedClass {
    pub key: String,
    pub name: String,
    pub line: usize,
    pub docstring: String,
    pub methods: Vec<CollectedMethod>,
    /// Method name -> receiver attributes assigned in it. Methods that
    /// assign none are absent.
    pub instance_vars: IndexMap<String, Vec<String>>,
}

/// Everything collected from one file.
#[derive(Debug, Clone, Default)]
pub struct FileCollection {
    /// Root-relative path, forward slashes.
    pub path: String,
    pub line_count: usize,
    pub classes: Vec<CollectedClass>,
    /// Module-level functions.
    pub functions: Vec<CollectedMethod>,
    /// Root module names imported anywhere in the file.
    pub imports: BTreeSet<String>,
    pub local_vars: HashMap<MethodKey, LocalVariables>,
}

impl FileCollection {
    /// Names of module-level functions, declaration order.
    pub fn global_functions(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.name.as_str())
    }

    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }
}
