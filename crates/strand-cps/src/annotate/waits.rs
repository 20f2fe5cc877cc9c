//! Pass A: mark wait-blocks and their ancestors `AWAIT`.

use strand_syntax::ast::*;
use strand_syntax::Span;

use super::Annotation;
use crate::config::TransformConfig;
use crate::error::{TransformError, TransformWarning};

/// Run the wait pass. Returns `false` when nesting exceeded the bound and
/// later passes must not run.
pub(super) fn mark_waits(
    func: &Function,
    config: &TransformConfig,
    annotation: &mut Annotation,
    errors: &mut Vec<TransformError>,
) -> bool {
    let mut marker = WaitMarker {
        config,
        flags: &mut annotation.flags,
        warnings: &mut annotation.warnings,
        errors,
        waits: Vec::new(),
        value_returns: Vec::new(),
        depth: 0,
        too_deep: false,
    };

    if let Some(name) = &func.name {
        marker.check_reserved(name);
    }
    for param in &func.params {
        marker.check_reserved(param);
    }

    let waits = marker.block(&func.body);
    if waits {
        let function = func.display_name().to_string();
        for span in std::mem::take(&mut marker.value_returns) {
            marker.errors.push(TransformError::ReturnValueInWaitingFunction {
                function: function.clone(),
                span,
            });
        }
    }
    !marker.too_deep
}

/// Defers seen so far in one enclosing wait-block.
struct WaitFrame {
    defers: usize,
}

struct WaitMarker<'a> {
    config: &'a TransformConfig,
    flags: &'a mut FlagTable,
    warnings: &'a mut Vec<TransformWarning>,
    errors: &'a mut Vec<TransformError>,
    waits: Vec<WaitFrame>,
    /// `return <value>` spans, reported once the function is known to wait
    value_returns: Vec<Span>,
    depth: usize,
    too_deep: bool,
}

impl WaitMarker<'_> {
    /// Returns whether the block contains a wait-block.
    fn block(&mut self, block: &Block) -> bool {
        let mut waits = false;
        for stmt in &block.statements {
            // No short-circuit: every statement is still validated.
            waits |= self.statement(stmt);
        }
        if waits {
            self.flags.mark(block.id, NodeFlags::AWAIT);
        }
        waits
    }

    fn statement(&mut self, stmt: &Statement) -> bool {
        if self.depth >= self.config.max_depth {
            if !self.too_deep {
                self.too_deep = true;
                self.errors.push(TransformError::NestingTooDeep {
                    limit: self.config.max_depth,
                    span: stmt.span,
                });
            }
            return false;
        }
        self.depth += 1;
        let waits = self.statement_kind(stmt);
        self.depth -= 1;

        if waits {
            self.flags.mark(stmt.id, NodeFlags::AWAIT);
        }
        waits
    }

    fn statement_kind(&mut self, stmt: &Statement) -> bool {
        match &stmt.kind {
            StatementKind::Let(decl) => {
                self.check_reserved(&decl.name);
                if let Some(init) = &decl.init {
                    self.expression(init);
                }
                false
            }
            StatementKind::Assign(assign) => {
                self.expression(&assign.target);
                self.expression(&assign.value);
                false
            }
            StatementKind::Expression(expr) => {
                self.expression(expr);
                false
            }
            StatementKind::Return(value) => {
                if let Some(value) = value {
                    self.value_returns.push(stmt.span);
                    self.expression(value);
                }
                false
            }
            StatementKind::Block(block) => self.block(block),
            StatementKind::If(if_stmt) => {
                self.expression(&if_stmt.condition);
                let then_waits = self.block(&if_stmt.then_branch);
                let else_waits = match &if_stmt.else_branch {
                    Some(block) => self.block(block),
                    None => false,
                };
                then_waits || else_waits
            }
            StatementKind::Switch(switch) => {
                self.expression(&switch.discriminant);
                let mut waits = false;
                for case in &switch.cases {
                    self.expression(&case.test);
                    waits |= self.block(&case.body);
                }
                if let Some(default) = &switch.default {
                    waits |= self.block(default);
                }
                waits
            }
            StatementKind::Loop(loop_stmt) => {
                match &loop_stmt.kind {
                    LoopKind::While { condition } | LoopKind::DoWhile { condition } => {
                        self.expression(condition)
                    }
                    LoopKind::For { init, test, update } => {
                        if let Some(init) = init {
                            self.statement(init);
                        }
                        if let Some(test) = test {
                            self.expression(test);
                        }
                        if let Some(update) = update {
                            self.statement(update);
                        }
                    }
                }
                self.block(&loop_stmt.body)
            }
            StatementKind::Break(_) | StatementKind::Continue(_) => false,
            StatementKind::Wait(body) => {
                self.waits.push(WaitFrame { defers: 0 });
                self.block(body);
                let frame = self.waits.pop();
                if frame.map_or(true, |f| f.defers == 0) {
                    self.warnings
                        .push(TransformWarning::EmptyWait { span: stmt.span });
                }
                true
            }
            StatementKind::Function(func) => {
                // The declared name lives in this function's scope; the rest
                // belongs to the nested unit.
                if let Some(name) = &func.name {
                    self.check_reserved(name);
                }
                false
            }
        }
    }

    fn expression(&mut self, expr: &Expression) {
        let mut scan = DeferScan {
            frame: self.waits.last_mut(),
            outside: Vec::new(),
        };
        scan.visit_expression(expr);
        for span in scan.outside {
            self.errors.push(TransformError::DeferOutsideWait { span });
        }
    }

    fn check_reserved(&mut self, name: &Identifier) {
        if self.config.is_reserved(&name.name) {
            self.errors.push(TransformError::ReservedIdentifier {
                name: name.name.clone(),
                prefix: self.config.reserved_prefix.clone(),
                span: name.span,
            });
        }
    }
}

/// Counts the defers of one expression against the innermost wait-block.
struct DeferScan<'f> {
    frame: Option<&'f mut WaitFrame>,
    outside: Vec<Span>,
}

impl Visitor for DeferScan<'_> {
    // Function expressions are compiled on their own.
    fn visit_function(&mut self, _func: &Function) {}

    fn visit_expression(&mut self, expr: &Expression) {
        if let Expression::Defer(defer) = expr {
            match self.frame.as_deref_mut() {
                Some(frame) => frame.defers += 1,
                None => self.outside.push(defer.span),
            }
        }
        walk_expression(self, expr);
    }
}
