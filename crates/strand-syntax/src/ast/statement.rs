//! Statement AST nodes
//!
//! This module defines all statement types in the Strand language, including:
//! - Declarations (let, nested functions) and assignments
//! - Control flow statements (if, switch, loops, break, continue, return)
//! - Wait-blocks

use super::*;
use crate::token::Span;
use serde::{Deserialize, Serialize};

/// A statement together with its identity and source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: NodeId,
    pub kind: StatementKind,
    pub span: Span,
}

impl Statement {
    pub fn new(id: NodeId, kind: StatementKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Whether this is a `break` or `continue`.
    pub fn is_jump(&self) -> bool {
        matches!(self.kind, StatementKind::Break(_) | StatementKind::Continue(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Variable declaration: `let x = e;` or `let x;`
    Let(LetStatement),

    /// Assignment: `x = e;` or `obj.field = e;`
    Assign(AssignStatement),

    /// Expression statement (e.g., function call)
    Expression(Expression),

    /// `return;` or `return e;`
    Return(Option<Expression>),

    /// Bare block: `{ ... }`
    Block(Block),

    If(IfStatement),

    Switch(SwitchStatement),

    /// `while`, `do ... while` or `for`
    Loop(LoopStatement),

    Break(JumpStatement),

    Continue(JumpStatement),

    /// `wait { ... }`
    Wait(Block),

    /// Nested function declaration
    Function(Function),
}

impl StatementKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatementKind::Let(_) => "let",
            StatementKind::Assign(_) => "assignment",
            StatementKind::Expression(_) => "expression",
            StatementKind::Return(_) => "return",
            StatementKind::Block(_) => "block",
            StatementKind::If(_) => "if",
            StatementKind::Switch(_) => "switch",
            StatementKind::Loop(_) => "loop",
            StatementKind::Break(_) => "break",
            StatementKind::Continue(_) => "continue",
            StatementKind::Wait(_) => "wait",
            StatementKind::Function(_) => "function",
        }
    }
}

/// `let name = init;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetStatement {
    pub name: Identifier,
    pub init: Option<Expression>,
}

/// `target = value;`
///
/// The target is an identifier or a member expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStatement {
    pub target: Expression,
    pub value: Expression,
}

/// If statement
///
/// `else if` chains are represented as an else-block holding a single If.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Block,
    pub else_branch: Option<Block>,
}

/// Switch statement. Arms never fall through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStatement {
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
    pub default: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub test: Expression,
    pub body: Block,
    pub span: Span,
}

/// Loop of any kind, optionally labeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopStatement {
    pub label: Option<Identifier>,
    pub kind: LoopKind,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoopKind {
    /// Pre-test: `while (condition) body`
    While { condition: Expression },

    /// Post-test: `do body while (condition);`
    DoWhile { condition: Expression },

    /// Iteration: `for (init; test; update) body`
    For {
        init: Option<Box<Statement>>,
        test: Option<Expression>,
        update: Option<Box<Statement>>,
    },
}

impl LoopKind {
    pub fn name(&self) -> &'static str {
        match self {
            LoopKind::While { .. } => "while",
            LoopKind::DoWhile { .. } => "do-while",
            LoopKind::For { .. } => "for",
        }
    }
}

/// Payload of `break` and `continue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpStatement {
    pub label: Option<Identifier>,
}
