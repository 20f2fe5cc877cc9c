//! Rotation: turn a block with marked statements into a continuation chain.
//!
//! A block is split at its first statement marked `AWAIT` or `PROPAGATE`.
//! Everything after that statement moves into a continuation routine
//! `function __kN() { ... }` declared just before it, and the statement is
//! wired (see [`wiring`]) so that it resumes `__kN` when it finishes. The
//! moved statements are rotated the same way, so every marked statement
//! ends up last in its block.
//!
//! Rotation works on owned values: `rotate_block(Block, tail) -> Block`,
//! where `tail` is the call resuming the enclosing continuation.

mod build;
mod control_flow;
mod defer;
mod names;
mod wiring;

pub use control_flow::{LoopContext, LoopStack};
pub use names::{LoopNames, NameGen};

use strand_syntax::ast::*;
use tracing::trace;

use crate::config::TransformConfig;
use crate::error::InternalError;

pub struct Rotator<'a> {
    flags: &'a FlagTable,
    config: &'a TransformConfig,
    ids: &'a mut NodeIdGen,
    names: &'a mut NameGen,
    loops: LoopStack,
}

impl<'a> Rotator<'a> {
    pub fn new(
        flags: &'a FlagTable,
        config: &'a TransformConfig,
        ids: &'a mut NodeIdGen,
        names: &'a mut NameGen,
    ) -> Self {
        Self {
            flags,
            config,
            ids,
            names,
            loops: LoopStack::new(),
        }
    }

    /// Rotate a function body. The end of the body ends the thread, so there
    /// is no tail.
    pub fn rotate_function(&mut self, func: &mut Function) -> Result<(), InternalError> {
        let placeholder = Block::new(func.body.id, Vec::new(), func.body.span);
        let body = std::mem::replace(&mut func.body, placeholder);
        func.body = self.rotate_block(body, None)?;
        Ok(())
    }

    fn is_split_point(&self, stmt: &Statement) -> bool {
        self.flags
            .has_any(stmt.id, NodeFlags::AWAIT | NodeFlags::PROPAGATE)
    }

    /// Rotate `block` so that it ends by evaluating `tail` (when given).
    pub fn rotate_block(&mut self, block: Block, tail: Option<Expression>) -> Result<Block, InternalError> {
        let Block {
            id,
            statements,
            span,
        } = block;

        // prefix, then each split point with the unmarked statements after it
        let mut prefix = Vec::new();
        let mut splits: Vec<(Statement, Vec<Statement>)> = Vec::new();
        for stmt in statements {
            if self.is_split_point(&stmt) {
                let jump = stmt.is_jump();
                splits.push((stmt, Vec::new()));
                if jump {
                    // Nothing after a redirected jump runs.
                    break;
                }
            } else if let Some((_, following)) = splits.last_mut() {
                following.push(stmt);
            } else {
                prefix.push(stmt);
            }
        }

        let mut tail = tail;
        if splits.is_empty() {
            if let Some(tail) = tail {
                prefix.push(build::expression_statement(self.ids, tail));
            }
            return Ok(Block::new(id, prefix, span));
        }

        // Continuations are named in source order; a split point needs one
        // when anything follows it, and a jump never does.
        let count = splits.len();
        let continuations: Vec<Option<String>> = splits
            .iter()
            .enumerate()
            .map(|(i, (stmt, following))| {
                let has_rest = i + 1 < count || !following.is_empty();
                (has_rest && !stmt.is_jump()).then(|| self.names.continuation())
            })
            .collect();

        // Build from the innermost continuation outwards.
        let mut after: Vec<Statement> = Vec::new();
        for (i, ((stmt, following), name)) in splits.into_iter().zip(continuations).enumerate().rev() {
            trace!(
                split = %stmt.id,
                kind = stmt.kind.name(),
                continuation = name.as_deref().unwrap_or("-"),
                "split block"
            );
            let (cont, declaration) = match name {
                Some(name) => {
                    let mut rest = following;
                    rest.append(&mut after);
                    if i + 1 == count {
                        if let Some(tail) = tail.take() {
                            rest.push(build::expression_statement(self.ids, tail));
                        }
                    }
                    let declaration = build::function_declaration(self.ids, &name, rest, stmt.span);
                    (Some(build::call(&name, stmt.span)), Some(declaration))
                }
                // Nothing follows: resume the enclosing continuation directly.
                None if stmt.is_jump() => (None, None),
                None => (tail.take(), None),
            };
            let wired = self.wire(stmt, cont)?;
            after.extend(declaration);
            after.push(wired);
        }

        prefix.append(&mut after);
        Ok(Block::new(id, prefix, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use strand_syntax::parse_module;
    use strand_syntax::printer::print_function;

    fn rotate(source: &str) -> String {
        let mut func = parse_module(source).unwrap().functions.remove(0);
        let config = TransformConfig::default();
        let annotation = annotate(&func, &config).unwrap();
        let mut ids = NodeIdGen::after(func.max_id());
        let mut names = NameGen::new("__");
        Rotator::new(&annotation.flags, &config, &mut ids, &mut names)
            .rotate_function(&mut func)
            .unwrap();
        print_function(&func)
    }

    #[test]
    fn test_unmarked_block_untouched() {
        let source = "function f() {\n    a();\n    if (x) {\n        b();\n    }\n}";
        assert_eq!(rotate(source), source);
    }

    #[test]
    fn test_split_after_wait() {
        let out = rotate("function f() { a(); wait { g(defer()); } b(); }");
        assert_eq!(
            out,
            "function f() {
    a();
    function __k1() {
        b();
    }
    {
        let __deferrals2 = newDeferralCounter();
        g(__deferrals2.defer());
        __deferrals2.wait(__k1);
    }
}"
        );
    }

    #[test]
    fn test_trailing_wait_resumes_nothing() {
        let out = rotate("function f() { wait { g(defer()); } }");
        assert_eq!(
            out,
            "function f() {
    {
        let __deferrals1 = newDeferralCounter();
        g(__deferrals1.defer());
        __deferrals1.wait(function () {});
    }
}"
        );
    }

    #[test]
    fn test_if_without_else_gets_one() {
        let out = rotate("function f() { if (x) { wait { g(defer()); } } b(); }");
        assert_eq!(
            out,
            "function f() {
    function __k1() {
        b();
    }
    if (x) {
        {
            let __deferrals2 = newDeferralCounter();
            g(__deferrals2.defer());
            __deferrals2.wait(__k1);
        }
    } else {
        __k1();
    }
}"
        );
    }

    #[test]
    fn test_sequential_waits_nest() {
        let out = rotate("function f() { wait { a(defer()); } wait { b(defer()); } c(); }");
        assert_eq!(
            out,
            "function f() {
    function __k1() {
        function __k2() {
            c();
        }
        {
            let __deferrals3 = newDeferralCounter();
            b(__deferrals3.defer());
            __deferrals3.wait(__k2);
        }
    }
    {
        let __deferrals4 = newDeferralCounter();
        a(__deferrals4.defer());
        __deferrals4.wait(__k1);
    }
}"
        );
    }

    #[test]
    fn test_break_goes_to_after_loop() {
        let out = rotate(
            "function f() { while (true) { if (x) { wait { g(defer()); } break; } h(); } done(); }",
        );
        assert_eq!(
            out,
            "function f() {
    function __k1() {
        done();
    }
    {
        function __loop2() {
            if (true) {
                function __k3() {
                    h();
                    __next2();
                }
                if (x) {
                    function __k4() {
                        __k1();
                    }
                    {
                        let __deferrals5 = newDeferralCounter();
                        g(__deferrals5.defer());
                        __deferrals5.wait(__k4);
                    }
                } else {
                    __k3();
                }
            } else {
                __k1();
            }
        }
        function __next2() {
            __loop2();
        }
        __loop2();
    }
}"
        );
    }
}
