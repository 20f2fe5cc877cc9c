//! Flag invariants checked over a corpus of functions.

use strand_cps::annotate::annotate;
use strand_cps::TransformConfig;
use strand_syntax::ast::*;
use strand_syntax::parse_module;

const CORPUS: &[&str] = &[
    "function f() { a(); b(); }",
    "function f() { wait { g(defer()); } }",
    "function f() { if (x) { wait { g(defer()); } } else { h(); } }",
    "function f() { while (x) { if (y) { break; } wait { g(defer()); } } }",
    "function f() { while (x) { while (y) { continue; } wait { g(defer()); } } }",
    "function f() { outer: for (let i = 0; i < 3; i = i + 1) { while (y) { if (z) { break outer; } } } wait { g(defer()); } }",
    "function f() { do { wait { g(defer()); } if (x) { continue; } } while (y); }",
    "function f() { switch (x) { case 1: wait { g(defer()); } case 2: h(); default: k(); } }",
    "function f() { wait { a(defer()); wait { b(defer()); } } c(); }",
    "function f() { let h = function () { wait { g(defer()); } }; while (x) { h(); break; } }",
    "function f() { { { wait { g(defer()); } } } x = 1; }",
    "function f() { while (x) { if (y) { { continue; } } wait { g(defer()); } } }",
    "function f() { a: while (x) { switch (y) { case 1: if (z) { break a; } default: h(); } wait { g(defer()); } } }",
    "function f() { while (x) { while (y) { if (z) { break; } wait { g(defer()); } } h(); } }",
    "function f() { for (let i = 0; i < 3; i = i + 1) { if (i == 1) { continue; } else { wait { g(defer()); } } } }",
];

fn functions() -> Vec<Function> {
    CORPUS
        .iter()
        .map(|source| parse_module(source).unwrap().functions.remove(0))
        .collect()
}

/// Whether `stmt` is or contains a wait-block of the same function.
fn contains_wait(stmt: &Statement) -> bool {
    struct Finder(bool);

    impl Visitor for Finder {
        fn visit_function(&mut self, _func: &Function) {}

        fn visit_statement(&mut self, stmt: &Statement) {
            if matches!(stmt.kind, StatementKind::Wait(_)) {
                self.0 = true;
            }
            walk_statement(self, stmt);
        }
    }

    let mut finder = Finder(false);
    finder.visit_statement(stmt);
    finder.0
}

/// Every statement of `func` itself, nested functions excluded.
fn statements(func: &Function) -> Vec<Statement> {
    struct Collector(Vec<Statement>);

    impl Visitor for Collector {
        fn visit_function(&mut self, _func: &Function) {}

        fn visit_statement(&mut self, stmt: &Statement) {
            self.0.push(stmt.clone());
            walk_statement(self, stmt);
        }
    }

    let mut collector = Collector(Vec::new());
    collector.visit_block(&func.body);
    collector.0
}

/// Every block of `func` itself, nested functions excluded.
fn blocks(func: &Function) -> Vec<Block> {
    struct Collector(Vec<Block>);

    impl Visitor for Collector {
        fn visit_function(&mut self, _func: &Function) {}

        fn visit_block(&mut self, block: &Block) {
            self.0.push(block.clone());
            walk_block(self, block);
        }
    }

    let mut collector = Collector(Vec::new());
    collector.visit_block(&func.body);
    collector.0
}

/// Ids that must carry `PROPAGATE`: for each jump whose target loop is
/// `LOOP`, the jump and every block and statement strictly between it and
/// that loop.
fn expected_propagate(func: &Function, flags: &FlagTable) -> Vec<NodeId> {
    struct Target {
        label: Option<String>,
        id: NodeId,
        /// Path length with the loop statement on it
        depth: usize,
    }

    struct Walker<'a> {
        flags: &'a FlagTable,
        path: Vec<NodeId>,
        loops: Vec<Target>,
        out: Vec<NodeId>,
    }

    impl Walker<'_> {
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
                StatementKind::Block(block) | StatementKind::Wait(block) => self.block(block),
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
                    self.loops.push(Target {
                        label: loop_stmt.label.as_ref().map(|l| l.name.clone()),
                        id: stmt.id,
                        depth: self.path.len(),
                    });
                    self.block(&loop_stmt.body);
                    self.loops.pop();
                }
                StatementKind::Break(jump) | StatementKind::Continue(jump) => {
                    let target = match &jump.label {
                        Some(label) => self
                            .loops
                            .iter()
                            .rev()
                            .find(|t| t.label.as_deref() == Some(label.name.as_str())),
                        None => self.loops.last(),
                    };
                    if let Some(target) = target {
                        if self.flags.has(target.id, NodeFlags::LOOP) {
                            self.out.extend_from_slice(&self.path[target.depth..]);
                        }
                    }
                }
                _ => {}
            }
            self.path.pop();
        }
    }

    let mut walker = Walker {
        flags,
        path: Vec::new(),
        loops: Vec::new(),
        out: Vec::new(),
    };
    walker.block(&func.body);
    walker.out.sort();
    walker.out.dedup();
    walker.out
}

#[test]
fn test_await_marks_exactly_wait_ancestors() {
    for func in functions() {
        let flags = annotate(&func, &TransformConfig::default()).unwrap().flags;
        for stmt in statements(&func) {
            assert_eq!(
                flags.has(stmt.id, NodeFlags::AWAIT),
                contains_wait(&stmt),
                "{} statement {} in {:?}",
                stmt.kind_name(),
                stmt.id,
                func.display_name()
            );
        }
    }
}

#[test]
fn test_await_marks_exactly_waiting_blocks() {
    for func in functions() {
        let flags = annotate(&func, &TransformConfig::default()).unwrap().flags;
        for block in blocks(&func) {
            let waits = block.statements.iter().any(contains_wait);
            assert_eq!(flags.has(block.id, NodeFlags::AWAIT), waits, "block {}", block.id);
        }
    }
}

#[test]
fn test_loop_flag_iff_waiting_loop() {
    for func in functions() {
        let flags = annotate(&func, &TransformConfig::default()).unwrap().flags;
        for stmt in statements(&func) {
            let expected = matches!(stmt.kind, StatementKind::Loop(_)) && contains_wait(&stmt);
            assert_eq!(flags.has(stmt.id, NodeFlags::LOOP), expected);
        }
    }
}

#[test]
fn test_propagate_only_on_jumps_and_their_ancestors() {
    for func in functions() {
        let flags = annotate(&func, &TransformConfig::default()).unwrap().flags;
        for stmt in statements(&func) {
            if !flags.has(stmt.id, NodeFlags::PROPAGATE) {
                continue;
            }
            struct JumpFinder(bool);
            impl Visitor for JumpFinder {
                fn visit_function(&mut self, _func: &Function) {}
                fn visit_statement(&mut self, stmt: &Statement) {
                    self.0 |= stmt.is_jump();
                    walk_statement(self, stmt);
                }
            }
            let mut finder = JumpFinder(false);
            finder.visit_statement(&stmt);
            assert!(finder.0, "{} marked PROPAGATE without a jump", stmt.kind_name());
        }
    }
}

#[test]
fn test_propagate_marks_exactly_paths_to_rotated_loops() {
    let mut marked_any = false;
    for func in functions() {
        let flags = annotate(&func, &TransformConfig::default()).unwrap().flags;
        let expected = expected_propagate(&func, &flags);
        marked_any |= !expected.is_empty();

        let stmts = statements(&func);
        let blks = blocks(&func);
        let ids = stmts
            .iter()
            .map(|s| s.id)
            .chain(blks.iter().map(|b| b.id));
        for id in ids {
            assert_eq!(
                flags.has(id, NodeFlags::PROPAGATE),
                expected.contains(&id),
                "node {} in {:?}",
                id,
                func.display_name()
            );
        }
    }
    assert!(marked_any);
}

#[test]
fn test_propagate_stops_below_target_loop() {
    let func = parse_module("function f() { while (x) { while (y) { if (z) { break; } wait { g(defer()); } } h(); } }")
        .unwrap()
        .functions
        .remove(0);
    let flags = annotate(&func, &TransformConfig::default()).unwrap().flags;

    let outer = &func.body.statements[0];
    let StatementKind::Loop(outer_loop) = &outer.kind else {
        panic!("expected loop, got {}", outer.kind_name());
    };
    let inner = &outer_loop.body.statements[0];
    let StatementKind::Loop(inner_loop) = &inner.kind else {
        panic!("expected loop, got {}", inner.kind_name());
    };
    let if_stmt = &inner_loop.body.statements[0];
    let StatementKind::If(branch) = &if_stmt.kind else {
        panic!("expected if, got {}", if_stmt.kind_name());
    };

    assert!(flags.has(outer.id, NodeFlags::LOOP) && flags.has(inner.id, NodeFlags::LOOP));
    for id in [inner_loop.body.id, if_stmt.id, branch.then_branch.id, branch.then_branch.statements[0].id] {
        assert!(flags.has(id, NodeFlags::PROPAGATE), "node {}", id);
    }
    for id in [func.body.id, outer.id, outer_loop.body.id, inner.id] {
        assert!(!flags.has(id, NodeFlags::PROPAGATE), "node {}", id);
    }
}

#[test]
fn test_annotation_is_deterministic() {
    for func in functions() {
        let config = TransformConfig::default();
        let first = annotate(&func, &config).unwrap();
        let second = annotate(&func, &config).unwrap();
        assert_eq!(first.flags, second.flags);
        assert_eq!(first.warnings, second.warnings);
    }
}

#[test]
fn test_non_waiting_loop_jumps_unmarked() {
    let func = parse_module("function f() { while (x) { while (y) { continue; } wait { g(defer()); } } }")
        .unwrap()
        .functions
        .remove(0);
    let flags = annotate(&func, &TransformConfig::default()).unwrap().flags;
    assert!(flags.ids_with(NodeFlags::PROPAGATE).is_empty());
    assert_eq!(flags.ids_with(NodeFlags::LOOP).len(), 1);
}

#[test]
fn test_nested_function_waits_do_not_mark_outer() {
    let func = parse_module("function f() { let h = function () { wait { g(defer()); } }; h(); }")
        .unwrap()
        .functions
        .remove(0);
    let annotation = annotate(&func, &TransformConfig::default()).unwrap();
    assert!(!annotation.has_wait(&func));
    assert!(annotation.flags.is_empty());
}
