//! Declaration hoisting for waiting functions.
//!
//! Rotation moves statements into nested continuation routines, so a `let`
//! executed in one routine would be invisible to its siblings. Each `let` is
//! turned into an assignment and a single `let x;` per name is declared at
//! the top of the function instead.

use rustc_hash::FxHashSet;
use strand_syntax::ast::*;
use strand_syntax::Span;

/// Hoist the declarations of `func`. Returns the hoisted names in
/// first-appearance order.
pub fn hoist_declarations(func: &mut Function, ids: &mut NodeIdGen) -> Vec<String> {
    let params: FxHashSet<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
    let mut collector = DeclarationCollector {
        params: &params,
        seen: FxHashSet::default(),
        names: Vec::new(),
    };
    collector.visit_block(&func.body);
    let names: Vec<(String, Span)> = collector.names;

    let mut rewriter = DeclarationRewriter;
    rewriter.visit_block_mut(&mut func.body);

    let mut statements = Vec::with_capacity(names.len() + func.body.len());
    for (name, span) in &names {
        statements.push(Statement::new(
            ids.fresh(),
            StatementKind::Let(LetStatement {
                name: Identifier::new(name.as_str(), *span),
                init: None,
            }),
            *span,
        ));
    }
    statements.append(&mut func.body.statements);
    func.body.statements = statements;

    names.into_iter().map(|(name, _)| name).collect()
}

struct DeclarationCollector<'p> {
    params: &'p FxHashSet<&'p str>,
    seen: FxHashSet<String>,
    names: Vec<(String, Span)>,
}

impl Visitor for DeclarationCollector<'_> {
    fn visit_function(&mut self, _func: &Function) {}

    fn visit_statement(&mut self, stmt: &Statement) {
        if let StatementKind::Let(decl) = &stmt.kind {
            let name = decl.name.name.as_str();
            if !self.params.contains(name) && self.seen.insert(name.to_string()) {
                self.names.push((name.to_string(), decl.name.span));
            }
        }
        walk_statement(self, stmt);
    }
}

/// `let x = e;` → `x = e;`, `let x;` → `x = null;`
struct DeclarationRewriter;

impl VisitorMut for DeclarationRewriter {
    fn visit_function_mut(&mut self, _func: &mut Function) {}

    fn visit_statement_mut(&mut self, stmt: &mut Statement) {
        if let StatementKind::Let(decl) = &mut stmt.kind {
            let target = Expression::Identifier(decl.name.clone());
            let value = decl
                .init
                .take()
                .unwrap_or(Expression::NullLiteral(decl.name.span));
            stmt.kind = StatementKind::Assign(AssignStatement { target, value });
        }
        walk_statement_mut(self, stmt);
    }
}
