//! Expression parsing (precedence climbing)

use super::precedence::{binary_operator, get_precedence, Precedence};
use super::{stmt, ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

/// Parse a full expression.
pub fn parse_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.enter("expression")?;
    let result = parse_binary(parser, Precedence::LogicalOr);
    parser.exit();
    result
}

fn parse_binary(parser: &mut Parser, min_prec: Precedence) -> Result<Expression, ParseError> {
    let mut left = parse_unary(parser)?;

    loop {
        let prec = get_precedence(parser.current());
        if prec == Precedence::None || prec < min_prec {
            break;
        }
        let operator = match binary_operator(parser.current()) {
            Some(op) => op,
            None => break,
        };
        parser.advance();

        // All binary operators are left-associative
        let right = parse_binary(parser, prec.next_level())?;
        let span = parser.combine_spans(left.span(), right.span());
        left = Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span,
        });
    }

    Ok(left)
}

fn parse_unary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    let operator = match parser.current() {
        Token::Bang => UnaryOperator::Not,
        Token::Minus => UnaryOperator::Minus,
        _ => return parse_postfix(parser),
    };
    parser.advance();

    parser.enter("unary")?;
    let operand = parse_unary(parser);
    parser.exit();
    let operand = operand?;

    let span = parser.combine_spans(&start_span, operand.span());
    Ok(Expression::Unary(UnaryExpression {
        operator,
        operand: Box::new(operand),
        span,
    }))
}

fn parse_postfix(parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut expr = parse_primary(parser)?;

    loop {
        match parser.current() {
            Token::LeftParen => {
                parser.advance();
                let mut arguments = Vec::new();
                if !parser.check(&Token::RightParen) {
                    loop {
                        arguments.push(parse_expression(parser)?);
                        if !parser.eat(&Token::Comma) {
                            break;
                        }
                    }
                }
                parser.expect(Token::RightParen)?;
                let span = parser.span_from(expr.span());
                expr = Expression::Call(CallExpression {
                    callee: Box::new(expr),
                    arguments,
                    span,
                });
            }
            Token::Dot => {
                parser.advance();
                let property = parser.expect_property_name()?;
                let span = parser.combine_spans(expr.span(), &property.span);
                expr = Expression::Member(MemberExpression {
                    object: Box::new(expr),
                    property,
                    span,
                });
            }
            _ => break,
        }
    }

    Ok(expr)
}

fn parse_primary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let span = parser.current_span();

    match parser.current().clone() {
        Token::IntLiteral(value) => {
            parser.advance();
            Ok(Expression::IntLiteral(IntLiteral { value, span }))
        }
        Token::StringLiteral(value) => {
            parser.advance();
            Ok(Expression::StringLiteral(StringLiteral { value, span }))
        }
        Token::True | Token::False => {
            let value = matches!(parser.advance(), Token::True);
            Ok(Expression::BooleanLiteral(BooleanLiteral { value, span }))
        }
        Token::Null => {
            parser.advance();
            Ok(Expression::NullLiteral(span))
        }
        Token::Identifier(name) => {
            parser.advance();
            Ok(Expression::Identifier(Identifier::new(name, span)))
        }
        Token::LeftParen => {
            parser.advance();
            let inner = parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            Ok(inner)
        }
        Token::Function => {
            let func = stmt::parse_function(parser, false)?;
            Ok(Expression::Function(Box::new(func)))
        }
        Token::Defer => {
            parser.advance();
            parser.expect(Token::LeftParen)?;
            let mut bindings = Vec::new();
            if !parser.check(&Token::RightParen) {
                loop {
                    bindings.push(parser.expect_identifier().map_err(|e| {
                        e.with_suggestion("defer() binds plain identifiers only")
                    })?);
                    if !parser.eat(&Token::Comma) {
                        break;
                    }
                }
            }
            parser.expect(Token::RightParen)?;
            Ok(Expression::Defer(DeferExpression {
                bindings,
                span: parser.span_from(&span),
            }))
        }
        _ => Err(parser.unexpected_token(&[
            Token::Identifier(String::new()),
            Token::IntLiteral(0),
            Token::StringLiteral(String::new()),
            Token::LeftParen,
        ])),
    }
}
