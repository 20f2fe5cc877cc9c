//! Abstract Syntax Tree for the Strand surface language.
//!
//! Every statement, block and function carries a [`NodeId`]. Analysis
//! results (see [`flags`]) are kept in side tables keyed by these ids so the
//! tree itself stays a plain owned value that can be rebuilt freely.

pub mod expression;
pub mod flags;
pub mod statement;
pub mod visitor;

pub use expression::*;
pub use flags::*;
pub use statement::*;
pub use visitor::*;

use crate::token::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a statement, block or function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dense [`NodeId`] allocator.
///
/// Once the id space runs out, `fresh` keeps returning `u32::MAX` and
/// [`NodeIdGen::is_exhausted`] reports it; callers check before trusting
/// the ids they were handed.
#[derive(Debug, Clone)]
pub struct NodeIdGen {
    next: Option<u32>,
    exhausted: bool,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self {
            next: Some(0),
            exhausted: false,
        }
    }

    /// Allocator whose first id is one past `max`.
    pub fn after(max: NodeId) -> Self {
        Self {
            next: max.0.checked_add(1),
            exhausted: false,
        }
    }

    pub fn fresh(&mut self) -> NodeId {
        match self.next {
            Some(next) => {
                self.next = next.checked_add(1);
                NodeId(next)
            }
            None => {
                self.exhausted = true;
                NodeId(u32::MAX)
            }
        }
    }

    /// Whether some `fresh` call found no id left.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Default for NodeIdGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Root of a source file: a sequence of function declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub functions: Vec<Function>,
    pub span: Span,
}

impl Module {
    pub fn new(functions: Vec<Function>, span: Span) -> Self {
        Self { functions, span }
    }

    /// Serialize the tree for exchange with a host compiler.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Largest id present anywhere in the module.
    pub fn max_id(&self) -> Option<NodeId> {
        let mut finder = MaxIdFinder::default();
        finder.visit_module(self);
        finder.max
    }
}

/// Function declaration or function expression.
///
/// # Example
/// ```text
/// function fetch(url, done) {
///     wait { get(url, defer(body)); }
///     done(body);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: NodeId,

    /// Absent for anonymous function expressions
    pub name: Option<Identifier>,

    pub params: Vec<Identifier>,

    pub body: Block,

    pub span: Span,
}

impl Function {
    /// Name used in diagnostics and logs.
    pub fn display_name(&self) -> &str {
        self.name
            .as_ref()
            .map(|n| n.name.as_str())
            .unwrap_or("<anonymous>")
    }

    /// Largest id present in this function, nested functions included.
    pub fn max_id(&self) -> NodeId {
        let mut finder = MaxIdFinder::default();
        finder.visit_function(self);
        finder.max.unwrap_or(self.id)
    }
}

/// Ordered statement sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Block {
    pub fn new(id: NodeId, statements: Vec<Statement>, span: Span) -> Self {
        Self {
            id,
            statements,
            span,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

/// Identifier (variable, function, parameter or label name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

#[derive(Default)]
struct MaxIdFinder {
    max: Option<NodeId>,
}

impl MaxIdFinder {
    fn record(&mut self, id: NodeId) {
        self.max = Some(self.max.map_or(id, |m| m.max(id)));
    }
}

impl Visitor for MaxIdFinder {
    fn visit_function(&mut self, func: &Function) {
        self.record(func.id);
        walk_function(self, func);
    }

    fn visit_block(&mut self, block: &Block) {
        self.record(block.id);
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        self.record(stmt.id);
        walk_statement(self, stmt);
    }
}
