//! AST visitor pattern for traversing the syntax tree
//!
//! This module provides visitor traits for walking the AST. [`Visitor`] is
//! used for analysis (marking, verification, collecting names), [`VisitorMut`]
//! for in-place rewrites (hoisting, defer lowering, nested-function
//! compilation).
//!
//! # Example
//!
//! ```rust
//! use strand_syntax::ast::*;
//!
//! struct CountWaits {
//!     count: usize,
//! }
//!
//! impl Visitor for CountWaits {
//!     fn visit_statement(&mut self, stmt: &Statement) {
//!         if matches!(stmt.kind, StatementKind::Wait(_)) {
//!             self.count += 1;
//!         }
//!         walk_statement(self, stmt);
//!     }
//! }
//! ```
//!
//! To stop the walk at function boundaries, override `visit_function` with
//! an empty body.

use super::*;

/// AST visitor trait
///
/// Implement this trait to traverse the AST. Each visit method has a default
/// implementation that calls the corresponding walk function.
pub trait Visitor: Sized {
    fn visit_module(&mut self, module: &Module) {
        walk_module(self, module);
    }

    fn visit_function(&mut self, func: &Function) {
        walk_function(self, func);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_identifier(&mut self, _id: &Identifier) {
        // Leaf node - no traversal needed
    }
}

// ============================================================================
// Walk Functions - Default Traversal Implementations
// ============================================================================

pub fn walk_module<V: Visitor>(visitor: &mut V, module: &Module) {
    for func in &module.functions {
        visitor.visit_function(func);
    }
}

pub fn walk_function<V: Visitor>(visitor: &mut V, func: &Function) {
    if let Some(name) = &func.name {
        visitor.visit_identifier(name);
    }
    for param in &func.params {
        visitor.visit_identifier(param);
    }
    visitor.visit_block(&func.body);
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    for stmt in &block.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, stmt: &Statement) {
    match &stmt.kind {
        StatementKind::Let(decl) => {
            visitor.visit_identifier(&decl.name);
            if let Some(init) = &decl.init {
                visitor.visit_expression(init);
            }
        }
        StatementKind::Assign(assign) => {
            visitor.visit_expression(&assign.target);
            visitor.visit_expression(&assign.value);
        }
        StatementKind::Expression(expr) => visitor.visit_expression(expr),
        StatementKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expression(value);
            }
        }
        StatementKind::Block(block) | StatementKind::Wait(block) => visitor.visit_block(block),
        StatementKind::If(stmt) => {
            visitor.visit_expression(&stmt.condition);
            visitor.visit_block(&stmt.then_branch);
            if let Some(else_branch) = &stmt.else_branch {
                visitor.visit_block(else_branch);
            }
        }
        StatementKind::Switch(stmt) => {
            visitor.visit_expression(&stmt.discriminant);
            for case in &stmt.cases {
                visitor.visit_expression(&case.test);
                visitor.visit_block(&case.body);
            }
            if let Some(default) = &stmt.default {
                visitor.visit_block(default);
            }
        }
        StatementKind::Loop(stmt) => match &stmt.kind {
            LoopKind::While { condition } => {
                visitor.visit_expression(condition);
                visitor.visit_block(&stmt.body);
            }
            LoopKind::DoWhile { condition } => {
                visitor.visit_block(&stmt.body);
                visitor.visit_expression(condition);
            }
            LoopKind::For { init, test, update } => {
                if let Some(init) = init {
                    visitor.visit_statement(init);
                }
                if let Some(test) = test {
                    visitor.visit_expression(test);
                }
                if let Some(update) = update {
                    visitor.visit_statement(update);
                }
                visitor.visit_block(&stmt.body);
            }
        },
        StatementKind::Break(_) | StatementKind::Continue(_) => {}
        StatementKind::Function(func) => visitor.visit_function(func),
    }
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::IntLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_) => {}
        Expression::Identifier(id) => visitor.visit_identifier(id),
        Expression::Unary(expr) => visitor.visit_expression(&expr.operand),
        Expression::Binary(expr) => {
            visitor.visit_expression(&expr.left);
            visitor.visit_expression(&expr.right);
        }
        Expression::Call(expr) => {
            visitor.visit_expression(&expr.callee);
            for arg in &expr.arguments {
                visitor.visit_expression(arg);
            }
        }
        // The property name is not a binding reference
        Expression::Member(expr) => visitor.visit_expression(&expr.object),
        Expression::Function(func) => visitor.visit_function(func),
        Expression::Defer(defer) => {
            for binding in &defer.bindings {
                visitor.visit_identifier(binding);
            }
        }
    }
}

// ============================================================================
// Mutable visitor
// ============================================================================

/// Mutable AST visitor. Same traversal order as [`Visitor`].
pub trait VisitorMut: Sized {
    fn visit_module_mut(&mut self, module: &mut Module) {
        walk_module_mut(self, module);
    }

    fn visit_function_mut(&mut self, func: &mut Function) {
        walk_function_mut(self, func);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_statement_mut(&mut self, stmt: &mut Statement) {
        walk_statement_mut(self, stmt);
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr);
    }
}

pub fn walk_module_mut<V: VisitorMut>(visitor: &mut V, module: &mut Module) {
    for func in &mut module.functions {
        visitor.visit_function_mut(func);
    }
}

pub fn walk_function_mut<V: VisitorMut>(visitor: &mut V, func: &mut Function) {
    visitor.visit_block_mut(&mut func.body);
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    for stmt in &mut block.statements {
        visitor.visit_statement_mut(stmt);
    }
}

pub fn walk_statement_mut<V: VisitorMut>(visitor: &mut V, stmt: &mut Statement) {
    match &mut stmt.kind {
        StatementKind::Let(decl) => {
            if let Some(init) = &mut decl.init {
                visitor.visit_expression_mut(init);
            }
        }
        StatementKind::Assign(assign) => {
            visitor.visit_expression_mut(&mut assign.target);
            visitor.visit_expression_mut(&mut assign.value);
        }
        StatementKind::Expression(expr) => visitor.visit_expression_mut(expr),
        StatementKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expression_mut(value);
            }
        }
        StatementKind::Block(block) | StatementKind::Wait(block) => {
            visitor.visit_block_mut(block)
        }
        StatementKind::If(stmt) => {
            visitor.visit_expression_mut(&mut stmt.condition);
            visitor.visit_block_mut(&mut stmt.then_branch);
            if let Some(else_branch) = &mut stmt.else_branch {
                visitor.visit_block_mut(else_branch);
            }
        }
        StatementKind::Switch(stmt) => {
            visitor.visit_expression_mut(&mut stmt.discriminant);
            for case in &mut stmt.cases {
                visitor.visit_expression_mut(&mut case.test);
                visitor.visit_block_mut(&mut case.body);
            }
            if let Some(default) = &mut stmt.default {
                visitor.visit_block_mut(default);
            }
        }
        StatementKind::Loop(stmt) => match &mut stmt.kind {
            LoopKind::While { condition } => {
                visitor.visit_expression_mut(condition);
                visitor.visit_block_mut(&mut stmt.body);
            }
            LoopKind::DoWhile { condition } => {
                visitor.visit_block_mut(&mut stmt.body);
                visitor.visit_expression_mut(condition);
            }
            LoopKind::For { init, test, update } => {
                if let Some(init) = init {
                    visitor.visit_statement_mut(init);
                }
                if let Some(test) = test {
                    visitor.visit_expression_mut(test);
                }
                if let Some(update) = update {
                    visitor.visit_statement_mut(update);
                }
                visitor.visit_block_mut(&mut stmt.body);
            }
        },
        StatementKind::Break(_) | StatementKind::Continue(_) => {}
        StatementKind::Function(func) => visitor.visit_function_mut(func),
    }
}

pub fn walk_expression_mut<V: VisitorMut>(visitor: &mut V, expr: &mut Expression) {
    match expr {
        Expression::IntLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_)
        | Expression::Identifier(_)
        | Expression::Defer(_) => {}
        Expression::Unary(expr) => visitor.visit_expression_mut(&mut expr.operand),
        Expression::Binary(expr) => {
            visitor.visit_expression_mut(&mut expr.left);
            visitor.visit_expression_mut(&mut expr.right);
        }
        Expression::Call(expr) => {
            visitor.visit_expression_mut(&mut expr.callee);
            for arg in &mut expr.arguments {
                visitor.visit_expression_mut(arg);
            }
        }
        Expression::Member(expr) => visitor.visit_expression_mut(&mut expr.object),
        Expression::Function(func) => visitor.visit_function_mut(func),
    }
}
