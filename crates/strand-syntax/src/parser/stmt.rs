//! Statement parsing

use super::guards::LoopGuard;
use super::{expr, ParseError, Parser};
use crate::ast::*;
use crate::token::{Span, Token};

/// Parse `function [name](params) { body }`.
///
/// `require_name` is set for declarations; function expressions may be
/// anonymous.
pub fn parse_function(parser: &mut Parser, require_name: bool) -> Result<Function, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Function)?;
    let id = parser.next_id();

    let name = if matches!(parser.current(), Token::Identifier(_)) {
        Some(parser.expect_identifier()?)
    } else if require_name {
        return Err(parser
            .unexpected_token(&[Token::Identifier(String::new())])
            .with_suggestion("function declarations need a name"));
    } else {
        None
    };

    parser.expect(Token::LeftParen)?;
    let mut params = Vec::new();
    if !parser.check(&Token::RightParen) {
        loop {
            params.push(parser.expect_identifier()?);
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }
    parser.expect(Token::RightParen)?;

    let body = parse_block(parser)?;
    let span = parser.combine_spans(&start_span, &body.span);

    Ok(Function {
        id,
        name,
        params,
        body,
        span,
    })
}

/// Parse `{ statements }`, recording statement-level errors and recovering.
pub fn parse_block(parser: &mut Parser) -> Result<Block, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let id = parser.next_id();

    let statements = parse_statements_until(parser, &[Token::RightBrace])?;

    parser.expect(Token::RightBrace)?;
    Ok(Block::new(id, statements, parser.span_from(&start_span)))
}

fn parse_statements_until(
    parser: &mut Parser,
    terminators: &[Token],
) -> Result<Vec<Statement>, ParseError> {
    let mut statements = Vec::new();
    let mut guard = LoopGuard::new("block");

    while !parser.at_eof() && !terminators.iter().any(|t| parser.check(t)) {
        guard.check(parser.current_span())?;
        let before = parser.pos;
        match parse_statement(parser) {
            Ok(stmt) => statements.push(stmt),
            Err(err) => {
                parser.record(err);
                parser.sync_to_statement_boundary();
                if parser.pos == before {
                    parser.advance();
                }
            }
        }
    }

    Ok(statements)
}

/// Parse a single statement.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    parser.enter("statement")?;
    let result = parse_statement_inner(parser);
    parser.exit();
    result
}

fn parse_statement_inner(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();

    match parser.current() {
        Token::Function => {
            let id = parser.next_id();
            let func = parse_function(parser, true)?;
            let span = func.span;
            Ok(Statement::new(id, StatementKind::Function(func), span))
        }
        Token::If => parse_if(parser),
        Token::Switch => parse_switch(parser),
        Token::While | Token::Do | Token::For => parse_loop(parser, None, start_span),
        Token::Identifier(_) if matches!(parser.peek(), Some(Token::Colon)) => {
            let label = parser.expect_identifier()?;
            parser.expect(Token::Colon)?;
            if !matches!(parser.current(), Token::While | Token::Do | Token::For) {
                return Err(ParseError::invalid_syntax(
                    format!("label '{}' must precede a loop", label.name),
                    label.span,
                ));
            }
            parse_loop(parser, Some(label), start_span)
        }
        Token::Break | Token::Continue => {
            let is_break = matches!(parser.advance(), Token::Break);
            let id = parser.next_id();
            let label = if matches!(parser.current(), Token::Identifier(_)) {
                Some(parser.expect_identifier()?)
            } else {
                None
            };
            parser.expect(Token::Semicolon)?;
            let jump = JumpStatement { label };
            let kind = if is_break {
                StatementKind::Break(jump)
            } else {
                StatementKind::Continue(jump)
            };
            Ok(Statement::new(id, kind, parser.span_from(&start_span)))
        }
        Token::Return => {
            parser.advance();
            let id = parser.next_id();
            let value = if parser.check(&Token::Semicolon) {
                None
            } else {
                Some(expr::parse_expression(parser)?)
            };
            parser.expect(Token::Semicolon)?;
            Ok(Statement::new(
                id,
                StatementKind::Return(value),
                parser.span_from(&start_span),
            ))
        }
        Token::Wait => {
            parser.advance();
            let id = parser.next_id();
            let body = parse_block(parser)?;
            Ok(Statement::new(
                id,
                StatementKind::Wait(body),
                parser.span_from(&start_span),
            ))
        }
        Token::LeftBrace => {
            let id = parser.next_id();
            let block = parse_block(parser)?;
            let span = block.span;
            Ok(Statement::new(id, StatementKind::Block(block), span))
        }
        _ => {
            let stmt = parse_simple_statement(parser, true)?;
            parser.expect(Token::Semicolon)?;
            Ok(Statement {
                span: parser.span_from(&start_span),
                ..stmt
            })
        }
    }
}

/// `let` declaration, assignment or expression, without the trailing `;`.
/// Also used for `for` initializers and updates.
fn parse_simple_statement(parser: &mut Parser, allow_let: bool) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();

    if parser.check(&Token::Let) {
        if !allow_let {
            return Err(ParseError::invalid_syntax(
                "declaration not allowed here",
                start_span,
            ));
        }
        parser.advance();
        let id = parser.next_id();
        let name = parser.expect_identifier()?;
        let init = if parser.eat(&Token::Equal) {
            Some(expr::parse_expression(parser)?)
        } else {
            None
        };
        return Ok(Statement::new(
            id,
            StatementKind::Let(LetStatement { name, init }),
            parser.span_from(&start_span),
        ));
    }

    let id = parser.next_id();
    let target = expr::parse_expression(parser)?;
    if parser.eat(&Token::Equal) {
        if !target.is_assignable() {
            return Err(ParseError::invalid_assignment_target(*target.span()));
        }
        let value = expr::parse_expression(parser)?;
        return Ok(Statement::new(
            id,
            StatementKind::Assign(AssignStatement { target, value }),
            parser.span_from(&start_span),
        ));
    }

    Ok(Statement::new(
        id,
        StatementKind::Expression(target),
        parser.span_from(&start_span),
    ))
}

fn parse_condition(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect(Token::LeftParen)?;
    let condition = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    Ok(condition)
}

fn parse_if(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::If)?;
    let id = parser.next_id();
    let condition = parse_condition(parser)?;
    let then_branch = parse_block(parser)?;

    let else_branch = if parser.eat(&Token::Else) {
        if parser.check(&Token::If) {
            let block_id = parser.next_id();
            let nested = parse_statement(parser)?;
            let span = nested.span;
            Some(Block::new(block_id, vec![nested], span))
        } else {
            Some(parse_block(parser)?)
        }
    } else {
        None
    };

    Ok(Statement::new(
        id,
        StatementKind::If(IfStatement {
            condition,
            then_branch,
            else_branch,
        }),
        parser.span_from(&start_span),
    ))
}

fn parse_switch(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Switch)?;
    let id = parser.next_id();
    let discriminant = parse_condition(parser)?;
    parser.expect(Token::LeftBrace)?;

    let arm_end = [Token::Case, Token::Default, Token::RightBrace];
    let mut cases = Vec::new();
    let mut default: Option<Block> = None;
    let mut guard = LoopGuard::new("switch");

    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        guard.check(parser.current_span())?;
        let arm_span = parser.current_span();
        if parser.eat(&Token::Case) {
            let test = expr::parse_expression(parser)?;
            parser.expect(Token::Colon)?;
            let block_id = parser.next_id();
            let statements = parse_statements_until(parser, &arm_end)?;
            let span = parser.span_from(&arm_span);
            cases.push(SwitchCase {
                test,
                body: Block::new(block_id, statements, span),
                span,
            });
        } else if parser.eat(&Token::Default) {
            parser.expect(Token::Colon)?;
            let block_id = parser.next_id();
            let statements = parse_statements_until(parser, &arm_end)?;
            if default.is_some() {
                return Err(ParseError::invalid_syntax(
                    "switch has more than one default arm",
                    arm_span,
                ));
            }
            default = Some(Block::new(block_id, statements, parser.span_from(&arm_span)));
        } else {
            return Err(parser.unexpected_token(&[Token::Case, Token::Default, Token::RightBrace]));
        }
    }

    parser.expect(Token::RightBrace)?;
    Ok(Statement::new(
        id,
        StatementKind::Switch(SwitchStatement {
            discriminant,
            cases,
            default,
        }),
        parser.span_from(&start_span),
    ))
}

fn parse_loop(
    parser: &mut Parser,
    label: Option<Identifier>,
    start_span: Span,
) -> Result<Statement, ParseError> {
    let keyword = parser.advance();
    let id = parser.next_id();

    let (kind, body) = match keyword {
        Token::While => {
            let condition = parse_condition(parser)?;
            let body = parse_block(parser)?;
            (LoopKind::While { condition }, body)
        }
        Token::Do => {
            let body = parse_block(parser)?;
            parser.expect(Token::While)?;
            let condition = parse_condition(parser)?;
            parser.expect(Token::Semicolon)?;
            (LoopKind::DoWhile { condition }, body)
        }
        _ => {
            parser.expect(Token::LeftParen)?;
            let init = if parser.check(&Token::Semicolon) {
                None
            } else {
                Some(Box::new(parse_simple_statement(parser, true)?))
            };
            parser.expect(Token::Semicolon)?;
            let test = if parser.check(&Token::Semicolon) {
                None
            } else {
                Some(expr::parse_expression(parser)?)
            };
            parser.expect(Token::Semicolon)?;
            let update = if parser.check(&Token::RightParen) {
                None
            } else {
                Some(Box::new(parse_simple_statement(parser, false)?))
            };
            parser.expect(Token::RightParen)?;
            let body = parse_block(parser)?;
            (LoopKind::For { init, test, update }, body)
        }
    };

    Ok(Statement::new(
        id,
        StatementKind::Loop(LoopStatement { label, kind, body }),
        parser.span_from(&start_span),
    ))
}
