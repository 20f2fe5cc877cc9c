//! Loop lowering.
//!
//! A `LOOP` loop becomes two routines: `__loopN` runs one iteration and
//! `__nextN` restarts it. The rotated body ends by calling `__nextN`, the
//! loop's exit runs the after-loop continuation, and marked jumps are
//! redirected through the [`LoopStack`].

use strand_syntax::ast::*;
use strand_syntax::Span;

use super::names::LoopNames;
use super::{build, Rotator};
use crate::error::InternalError;

/// Continuations of one lowered loop
#[derive(Debug, Clone)]
pub struct LoopContext {
    /// After-loop continuation; `None` when nothing follows the loop
    pub exit: Option<Expression>,
    /// Call to the restart routine
    pub next: Expression,
    pub label: Option<String>,
}

impl LoopContext {
    pub fn new(exit: Option<Expression>, next: Expression) -> Self {
        Self {
            exit,
            next,
            label: None,
        }
    }

    pub fn labeled(exit: Option<Expression>, next: Expression, label: impl Into<String>) -> Self {
        Self {
            exit,
            next,
            label: Some(label.into()),
        }
    }
}

/// Stack of lowered loops enclosing the block being rotated
#[derive(Debug, Default)]
pub struct LoopStack {
    stack: Vec<LoopContext>,
}

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ctx: LoopContext) {
        self.stack.push(ctx);
    }

    pub fn pop(&mut self) -> Option<LoopContext> {
        self.stack.pop()
    }

    /// Get the current (innermost) loop context
    pub fn current(&self) -> Option<&LoopContext> {
        self.stack.last()
    }

    pub fn find_by_label(&self, label: &str) -> Option<&LoopContext> {
        self.stack
            .iter()
            .rev()
            .find(|ctx| ctx.label.as_deref() == Some(label))
    }

    /// The loop a `break`/`continue` with this label targets.
    pub fn target(&self, label: Option<&str>) -> Option<&LoopContext> {
        match label {
            Some(l) => self.find_by_label(l),
            None => self.current(),
        }
    }
}

impl Rotator<'_> {
    /// Lower a `LOOP` loop; `exit` resumes whatever follows it.
    pub(super) fn lower_loop(
        &mut self,
        loop_stmt: LoopStatement,
        exit: Option<Expression>,
        span: Span,
    ) -> Result<Block, InternalError> {
        let LoopNames { restart, next } = self.names.loop_routines();
        let restart_call = build::call(&restart, span);
        let next_call = build::call(&next, span);
        let LoopStatement { label, kind, body } = loop_stmt;

        let ctx = match label {
            Some(label) => LoopContext::labeled(exit.clone(), next_call.clone(), label.name),
            None => LoopContext::new(exit.clone(), next_call.clone()),
        };
        self.loops.push(ctx);
        let body = self.rotate_block(body, Some(next_call));
        self.loops.pop();
        let body = body?;

        let exit_stmt = self.exit_statement(exit, span);
        let mut statements = Vec::new();
        let (restart_body, next_body) = match kind {
            LoopKind::While { condition } => {
                let branch = self.branch(condition, body, exit_stmt, span);
                let again = build::expression_statement(self.ids, restart_call);
                (vec![branch], vec![again])
            }
            LoopKind::DoWhile { condition } => {
                let again = build::expression_statement(self.ids, restart_call);
                let again = build::block(self.ids, vec![again], span);
                let branch = self.branch(condition, again, exit_stmt, span);
                (body.statements, vec![branch])
            }
            LoopKind::For { init, test, update } => {
                if let Some(init) = init {
                    statements.push(*init);
                }
                let restart_body = match test {
                    Some(test) => vec![self.branch(test, body, exit_stmt, span)],
                    // Only a marked break leaves a loop without a test
                    None => body.statements,
                };
                let mut next_body = Vec::new();
                if let Some(update) = update {
                    next_body.push(*update);
                }
                next_body.push(build::expression_statement(self.ids, restart_call));
                (restart_body, next_body)
            }
        };

        statements.push(build::function_declaration(self.ids, &restart, restart_body, span));
        statements.push(build::function_declaration(self.ids, &next, next_body, span));
        statements.push(build::expression_statement(self.ids, build::call(&restart, span)));
        Ok(build::block(self.ids, statements, span))
    }

    /// Replace a marked `break`/`continue` by a call into its loop's routines.
    pub(super) fn lower_jump(
        &mut self,
        id: NodeId,
        is_break: bool,
        jump: JumpStatement,
        span: Span,
    ) -> Result<Statement, InternalError> {
        let keyword = if is_break { "break" } else { "continue" };
        let label = jump.label.as_ref().map(|l| l.name.as_str());
        let ctx = self
            .loops
            .target(label)
            .ok_or(InternalError::PropagateWithoutLoop { kind: keyword, span })?;

        let kind = if is_break {
            match &ctx.exit {
                Some(exit) => StatementKind::Expression(exit.clone()),
                None => StatementKind::Return(None),
            }
        } else {
            StatementKind::Expression(ctx.next.clone())
        };
        Ok(Statement::new(id, kind, span))
    }

    /// `exit();`, or `return;` when the loop ends its thread.
    fn exit_statement(&mut self, exit: Option<Expression>, span: Span) -> Statement {
        match exit {
            Some(exit) => build::expression_statement(self.ids, exit),
            None => build::statement(self.ids, StatementKind::Return(None), span),
        }
    }

    /// `if (condition) { then } else { otherwise }`
    fn branch(&mut self, condition: Expression, then: Block, otherwise: Statement, span: Span) -> Statement {
        let else_branch = build::block(self.ids, vec![otherwise], span);
        build::statement(
            self.ids,
            StatementKind::If(IfStatement {
                condition,
                then_branch: then,
                else_branch: Some(else_branch),
            }),
            span,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str) -> Expression {
        build::call(name, Span::default())
    }

    #[test]
    fn test_loop_stack() {
        let mut stack = LoopStack::new();
        assert!(stack.target(None).is_none());

        stack.push(LoopContext::labeled(Some(call("__k1")), call("__next2"), "outer"));
        stack.push(LoopContext::new(None, call("__next3")));
        assert_eq!(stack.target(None).unwrap().next, call("__next3"));
        assert!(stack.target(None).unwrap().exit.is_none());
        assert_eq!(stack.target(Some("outer")).unwrap().exit, Some(call("__k1")));
        assert!(stack.target(Some("missing")).is_none());

        stack.pop();
        stack.pop();
        assert!(stack.target(None).is_none());
    }
}
