//! Post-rotation checks.
//!
//! After rotation a function must hold no wait-block, no defer and no `LOOP`
//! loop, and every statement marked `AWAIT` or `PROPAGATE` must be the last
//! of its block. Synthesized routines (ids above the original tree) are
//! part of the function and are checked; user-written nested functions are
//! separate units and are skipped.

use strand_syntax::ast::*;

use crate::error::InternalError;

pub fn verify_rotation(func: &Function, flags: &FlagTable, original_max: NodeId) -> Result<(), InternalError> {
    let mut verifier = RotationVerifier {
        flags,
        original_max,
        error: None,
    };
    verifier.visit_block(&func.body);
    match verifier.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

struct RotationVerifier<'a> {
    flags: &'a FlagTable,
    original_max: NodeId,
    /// First violation found
    error: Option<InternalError>,
}

impl RotationVerifier<'_> {
    fn report(&mut self, error: InternalError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

impl Visitor for RotationVerifier<'_> {
    fn visit_function(&mut self, func: &Function) {
        if func.id > self.original_max {
            walk_function(self, func);
        }
    }

    fn visit_block(&mut self, block: &Block) {
        if let Some((_, init)) = block.statements.split_last() {
            for stmt in init {
                if self
                    .flags
                    .has_any(stmt.id, NodeFlags::AWAIT | NodeFlags::PROPAGATE)
                {
                    self.report(InternalError::ResidualMark {
                        id: stmt.id,
                        kind: stmt.kind.name(),
                        span: stmt.span,
                    });
                }
            }
        }
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Wait(_) => self.report(InternalError::UnloweredNode {
                kind: "wait-block",
                span: stmt.span,
            }),
            StatementKind::Loop(_) if self.flags.has(stmt.id, NodeFlags::LOOP) => {
                self.report(InternalError::UnloweredNode {
                    kind: "waiting loop",
                    span: stmt.span,
                })
            }
            _ => {}
        }
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        if let Expression::Defer(defer) = expr {
            self.report(InternalError::UnloweredNode {
                kind: "defer",
                span: defer.span,
            });
        }
        walk_expression(self, expr);
    }
}
