//! Constructors for synthesized nodes. Every node gets a fresh id.

use strand_syntax::ast::*;
use strand_syntax::Span;

pub(crate) fn statement(ids: &mut NodeIdGen, kind: StatementKind, span: Span) -> Statement {
    Statement::new(ids.fresh(), kind, span)
}

pub(crate) fn block(ids: &mut NodeIdGen, statements: Vec<Statement>, span: Span) -> Block {
    Block::new(ids.fresh(), statements, span)
}

/// `name()`
pub(crate) fn call(name: &str, span: Span) -> Expression {
    Expression::call(Expression::identifier(name, span), Vec::new(), span)
}

pub(crate) fn expression_statement(ids: &mut NodeIdGen, expr: Expression) -> Statement {
    let span = *expr.span();
    statement(ids, StatementKind::Expression(expr), span)
}

/// `let name = init;`
pub(crate) fn let_statement(
    ids: &mut NodeIdGen,
    name: &str,
    init: Option<Expression>,
    span: Span,
) -> Statement {
    statement(
        ids,
        StatementKind::Let(LetStatement {
            name: Identifier::new(name, span),
            init,
        }),
        span,
    )
}

pub(crate) fn function(
    ids: &mut NodeIdGen,
    name: Option<&str>,
    params: Vec<Identifier>,
    statements: Vec<Statement>,
    span: Span,
) -> Function {
    Function {
        id: ids.fresh(),
        name: name.map(|n| Identifier::new(n, span)),
        params,
        body: block(ids, statements, span),
        span,
    }
}

/// `function name() { statements }`
pub(crate) fn function_declaration(
    ids: &mut NodeIdGen,
    name: &str,
    statements: Vec<Statement>,
    span: Span,
) -> Statement {
    let func = function(ids, Some(name), Vec::new(), statements, span);
    statement(ids, StatementKind::Function(func), span)
}

/// `function (params) { statements }`
pub(crate) fn function_expression(
    ids: &mut NodeIdGen,
    params: Vec<Identifier>,
    statements: Vec<Statement>,
    span: Span,
) -> Expression {
    Expression::Function(Box::new(function(ids, None, params, statements, span)))
}
