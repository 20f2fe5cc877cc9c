//! Pass B: loops that wait become `LOOP`.

use strand_syntax::ast::*;

pub(super) fn mark_loops(func: &Function, flags: &mut FlagTable) {
    let mut marker = LoopMarker { flags };
    marker.visit_block(&func.body);
}

struct LoopMarker<'a> {
    flags: &'a mut FlagTable,
}

impl Visitor for LoopMarker<'_> {
    fn visit_function(&mut self, _func: &Function) {}

    fn visit_statement(&mut self, stmt: &Statement) {
        // Unmarked subtrees hold no waits.
        if !self.flags.has(stmt.id, NodeFlags::AWAIT) {
            return;
        }
        if matches!(stmt.kind, StatementKind::Loop(_)) {
            self.flags.mark(stmt.id, NodeFlags::LOOP);
        }
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, _expr: &Expression) {}
}
