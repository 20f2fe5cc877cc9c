//! Pass C: `break`/`continue` escaping through rotated loops.
//!
//! A jump whose target loop is `LOOP` cannot stay a native jump once that
//! loop becomes a pair of routines, so the jump and every node between it
//! and the loop get `PROPAGATE`. Target resolution also validates jumps:
//! missing loops and labels, jumps out of a wait-block and labeled jumps
//! that would cross a rotated loop.

use strand_syntax::ast::*;
use strand_syntax::Span;

use crate::error::TransformError;

pub(super) fn mark_jumps(func: &Function, flags: &mut FlagTable, errors: &mut Vec<TransformError>) {
    let mut marker = JumpMarker {
        flags,
        errors,
        loops: Vec::new(),
        path: Vec::new(),
        waits: Vec::new(),
    };
    marker.block(&func.body);
}

/// An enclosing loop as seen from a jump.
struct LoopFrame {
    label: Option<String>,
    marked: bool,
    /// Length of `path` once the loop statement itself is on it
    path_len: usize,
    /// Number of wait-blocks enclosing the loop
    wait_depth: usize,
    span: Span,
}

struct JumpMarker<'a> {
    flags: &'a mut FlagTable,
    errors: &'a mut Vec<TransformError>,
    loops: Vec<LoopFrame>,
    /// Ids from the function body down to the current node
    path: Vec<NodeId>,
    /// Spans of the enclosing wait-blocks
    waits: Vec<Span>,
}

impl JumpMarker<'_> {
    fn block(&mut self, block: &Block) {
        self.path.push(block.id);
        for stmt in &block.statements {
            self.statement(stmt);
        }
        self.path.pop();
    }

    fn statement(&mut self, stmt: &Statement) {
        self.path.push(stmt.id);
        match &stmt.kind {
            StatementKind::Block(block) => self.block(block),
            StatementKind::Wait(block) => {
                self.waits.push(stmt.span);
                self.block(block);
                self.waits.pop();
            }
            StatementKind::If(if_stmt) => {
                self.block(&if_stmt.then_branch);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.block(else_branch);
                }
            }
            StatementKind::Switch(switch) => {
                for case in &switch.cases {
                    self.block(&case.body);
                }
                if let Some(default) = &switch.default {
                    self.block(default);
                }
            }
            StatementKind::Loop(loop_stmt) => {
                self.loops.push(LoopFrame {
                    label: loop_stmt.label.as_ref().map(|l| l.name.clone()),
                    marked: self.flags.has(stmt.id, NodeFlags::LOOP),
                    path_len: self.path.len(),
                    wait_depth: self.waits.len(),
                    span: stmt.span,
                });
                self.block(&loop_stmt.body);
                self.loops.pop();
            }
            StatementKind::Break(jump) => self.jump("break", jump, stmt),
            StatementKind::Continue(jump) => self.jump("continue", jump, stmt),
            StatementKind::Let(_)
            | StatementKind::Assign(_)
            | StatementKind::Expression(_)
            | StatementKind::Return(_)
            | StatementKind::Function(_) => {}
        }
        self.path.pop();
    }

    fn jump(&mut self, keyword: &'static str, jump: &JumpStatement, stmt: &Statement) {
        let Some(target) = self.resolve(keyword, jump, stmt.span) else {
            return;
        };
        let frame = &self.loops[target];

        if frame.wait_depth < self.waits.len() {
            let wait_span = self.waits[frame.wait_depth];
            self.errors.push(TransformError::JumpOutOfWait {
                keyword,
                span: stmt.span,
                wait_span,
            });
            return;
        }

        let innermost = self.loops.len() - 1;
        if target != innermost && self.loops[target..].iter().any(|f| f.marked) {
            self.errors.push(TransformError::CrossLoopJump {
                keyword,
                label: jump
                    .label
                    .as_ref()
                    .map(|l| l.name.clone())
                    .unwrap_or_default(),
                span: stmt.span,
                inner_span: self.loops[innermost].span,
            });
            return;
        }

        if frame.marked {
            // Everything strictly below the loop statement, the jump included
            for id in &self.path[frame.path_len..] {
                self.flags.mark(*id, NodeFlags::PROPAGATE);
            }
        }
    }

    /// Index of the loop targeted by `jump` in `self.loops`.
    fn resolve(&mut self, keyword: &'static str, jump: &JumpStatement, span: Span) -> Option<usize> {
        match &jump.label {
            Some(label) => {
                let found = self
                    .loops
                    .iter()
                    .rposition(|f| f.label.as_deref() == Some(label.name.as_str()));
                if found.is_none() {
                    self.errors.push(TransformError::UndefinedLabel {
                        label: label.name.clone(),
                        span: label.span,
                    });
                }
                found
            }
            None if self.loops.is_empty() => {
                self.errors.push(if keyword == "break" {
                    TransformError::BreakOutsideLoop { span }
                } else {
                    TransformError::ContinueOutsideLoop { span }
                });
                None
            }
            None => Some(self.loops.len() - 1),
        }
    }
}
