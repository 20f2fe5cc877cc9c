//! Defer lowering: `defer(x, y)` becomes a call on the wait-block's counter.

use strand_syntax::ast::*;

use super::build;
use super::names::NameGen;
use crate::config::TransformConfig;

/// Rewrite every defer belonging to a wait-block body into
/// `counter.defer(...)`. Defers inside nested wait-blocks belong to those
/// blocks and are left alone.
pub(crate) fn rewrite_defers(
    body: &mut Block,
    counter: &str,
    config: &TransformConfig,
    names: &NameGen,
    ids: &mut NodeIdGen,
) -> usize {
    let mut rewriter = DeferRewriter {
        counter,
        config,
        names,
        ids,
        rewritten: 0,
    };
    rewriter.visit_block_mut(body);
    rewriter.rewritten
}

struct DeferRewriter<'a> {
    counter: &'a str,
    config: &'a TransformConfig,
    names: &'a NameGen,
    ids: &'a mut NodeIdGen,
    rewritten: usize,
}

impl DeferRewriter<'_> {
    /// `counter.defer()` or
    /// `counter.defer(function (__a0, __a1) { x = __a0; y = __a1; })`
    fn lower(&mut self, defer: &DeferExpression) -> Expression {
        let span = defer.span;
        let callee = Expression::member(
            Expression::identifier(self.counter, span),
            &self.config.runtime.defer,
            span,
        );

        let mut arguments = Vec::new();
        if !defer.bindings.is_empty() {
            let mut params = Vec::with_capacity(defer.bindings.len());
            let mut assignments = Vec::with_capacity(defer.bindings.len());
            for (index, binding) in defer.bindings.iter().enumerate() {
                let param = Identifier::new(self.names.argument(index), binding.span);
                assignments.push(build::statement(
                    self.ids,
                    StatementKind::Assign(AssignStatement {
                        target: Expression::Identifier(binding.clone()),
                        value: Expression::Identifier(param.clone()),
                    }),
                    binding.span,
                ));
                params.push(param);
            }
            arguments.push(build::function_expression(self.ids, params, assignments, span));
        }

        Expression::call(callee, arguments, span)
    }
}

impl VisitorMut for DeferRewriter<'_> {
    fn visit_function_mut(&mut self, _func: &mut Function) {}

    fn visit_statement_mut(&mut self, stmt: &mut Statement) {
        if matches!(stmt.kind, StatementKind::Wait(_)) {
            return;
        }
        walk_statement_mut(self, stmt);
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        if let Expression::Defer(defer) = expr {
            let lowered = self.lower(defer);
            *expr = lowered;
            self.rewritten += 1;
            return;
        }
        walk_expression_mut(self, expr);
    }
}
