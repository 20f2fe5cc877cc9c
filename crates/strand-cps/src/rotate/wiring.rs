//! Continuation wiring: attach the continuation of a split point by kind.

use strand_syntax::ast::*;
use strand_syntax::Span;

use super::{build, defer, Rotator};
use crate::error::InternalError;

impl Rotator<'_> {
    /// Wire `cont` (the call resuming everything after `stmt`) into `stmt`.
    /// Lowered nodes keep the id of the statement they replace.
    pub(super) fn wire(&mut self, stmt: Statement, cont: Option<Expression>) -> Result<Statement, InternalError> {
        let Statement { id, kind, span } = stmt;
        let kind = match kind {
            StatementKind::Block(block) => StatementKind::Block(self.rotate_block(block, cont)?),
            StatementKind::If(if_stmt) => StatementKind::If(self.wire_if(if_stmt, cont, span)?),
            StatementKind::Switch(switch) => StatementKind::Switch(self.wire_switch(switch, cont, span)?),
            StatementKind::Wait(body) => StatementKind::Block(self.lower_wait(body, cont, span)?),
            StatementKind::Loop(loop_stmt) if self.flags.has(id, NodeFlags::LOOP) => {
                StatementKind::Block(self.lower_loop(loop_stmt, cont, span)?)
            }
            StatementKind::Break(jump) => return self.lower_jump(id, true, jump, span),
            StatementKind::Continue(jump) => return self.lower_jump(id, false, jump, span),
            other => {
                return Err(InternalError::UnexpectedPivot {
                    id,
                    kind: other.name(),
                    span,
                })
            }
        };
        Ok(Statement::new(id, kind, span))
    }

    /// Both branches resume `cont`; a missing else gets one holding only
    /// the call.
    fn wire_if(
        &mut self,
        if_stmt: IfStatement,
        cont: Option<Expression>,
        span: Span,
    ) -> Result<IfStatement, InternalError> {
        let IfStatement {
            condition,
            then_branch,
            else_branch,
        } = if_stmt;
        let then_branch = self.rotate_block(then_branch, cont.clone())?;
        let else_branch = self.wire_arm(else_branch, cont, span)?;
        Ok(IfStatement {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn wire_switch(
        &mut self,
        switch: SwitchStatement,
        cont: Option<Expression>,
        span: Span,
    ) -> Result<SwitchStatement, InternalError> {
        let SwitchStatement {
            discriminant,
            cases,
            default,
        } = switch;
        let cases = cases
            .into_iter()
            .map(|case| {
                Ok(SwitchCase {
                    test: case.test,
                    body: self.rotate_block(case.body, cont.clone())?,
                    span: case.span,
                })
            })
            .collect::<Result<Vec<_>, InternalError>>()?;
        let default = self.wire_arm(default, cont, span)?;
        Ok(SwitchStatement {
            discriminant,
            cases,
            default,
        })
    }

    /// Rotate an optional arm, synthesizing it when absent and there is
    /// something to resume.
    fn wire_arm(
        &mut self,
        arm: Option<Block>,
        cont: Option<Expression>,
        span: Span,
    ) -> Result<Option<Block>, InternalError> {
        match (arm, cont) {
            (Some(block), cont) => Ok(Some(self.rotate_block(block, cont)?)),
            (None, Some(cont)) => {
                let call = build::expression_statement(self.ids, cont);
                Ok(Some(build::block(self.ids, vec![call], span)))
            }
            (None, None) => Ok(None),
        }
    }

    /// Lower `wait { body }`:
    ///
    /// ```text
    /// {
    ///     let __deferralsN = newDeferralCounter();
    ///     body'                        // defers call __deferralsN.defer(...)
    ///     __deferralsN.wait(k);        // at the innermost tail of body'
    /// }
    /// ```
    fn lower_wait(&mut self, mut body: Block, cont: Option<Expression>, span: Span) -> Result<Block, InternalError> {
        let counter = self.names.counter();
        let defers = defer::rewrite_defers(&mut body, &counter, self.config, self.names, self.ids);
        tracing::trace!(counter = %counter, defers, "lowering wait-block");

        let resume = Expression::call(
            Expression::member(
                Expression::identifier(counter.as_str(), span),
                &self.config.runtime.wait,
                span,
            ),
            vec![self.continuation_value(cont, span)],
            span,
        );
        let body = self.rotate_block(body, Some(resume))?;

        let create = build::let_statement(
            self.ids,
            &counter,
            Some(build::call(&self.config.runtime.new_counter, span)),
            span,
        );
        let mut statements = Vec::with_capacity(body.len() + 1);
        statements.push(create);
        statements.extend(body.statements);
        Ok(Block::new(body.id, statements, body.span))
    }

    /// The value handed to `counter.wait`: the continuation routine itself
    /// when `cont` is a plain `k()` call, otherwise a closure running `cont`.
    fn continuation_value(&mut self, cont: Option<Expression>, span: Span) -> Expression {
        match cont {
            Some(Expression::Call(call))
                if call.arguments.is_empty() && matches!(*call.callee, Expression::Identifier(_)) =>
            {
                *call.callee
            }
            Some(cont) => {
                let stmt = build::expression_statement(self.ids, cont);
                build::function_expression(self.ids, Vec::new(), vec![stmt], span)
            }
            None => build::function_expression(self.ids, Vec::new(), Vec::new(), span),
        }
    }
}
