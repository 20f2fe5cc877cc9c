//! Operator precedence table for expression parsing.

use crate::ast::BinaryOperator;
use crate::token::Token;

/// Operator precedence level (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    LogicalOr = 1,      // ||
    LogicalAnd = 2,     // &&
    Equality = 3,       // ==, !=
    Relational = 4,     // <, >, <=, >=
    Additive = 5,       // +, -
    Multiplicative = 6, // *, /, %
    Unary = 7,          // !, -
}

impl Precedence {
    /// Next tighter level; used for left-associative operators.
    pub fn next_level(self) -> Precedence {
        match self {
            Precedence::None => Precedence::LogicalOr,
            Precedence::LogicalOr => Precedence::LogicalAnd,
            Precedence::LogicalAnd => Precedence::Equality,
            Precedence::Equality => Precedence::Relational,
            Precedence::Relational => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative | Precedence::Unary => Precedence::Unary,
        }
    }
}

/// Get the precedence of a binary operator token.
pub fn get_precedence(token: &Token) -> Precedence {
    match token {
        Token::PipePipe => Precedence::LogicalOr,
        Token::AmpAmp => Precedence::LogicalAnd,
        Token::EqualEqual | Token::BangEqual => Precedence::Equality,
        Token::Less | Token::LessEqual | Token::Greater | Token::GreaterEqual => {
            Precedence::Relational
        }
        Token::Plus | Token::Minus => Precedence::Additive,
        Token::Star | Token::Slash | Token::Percent => Precedence::Multiplicative,
        _ => Precedence::None,
    }
}

/// Map a binary operator token to its AST operator.
pub fn binary_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::PipePipe => BinaryOperator::Or,
        Token::AmpAmp => BinaryOperator::And,
        Token::EqualEqual => BinaryOperator::Equal,
        Token::BangEqual => BinaryOperator::NotEqual,
        Token::Less => BinaryOperator::Less,
        Token::LessEqual => BinaryOperator::LessEqual,
        Token::Greater => BinaryOperator::Greater,
        Token::GreaterEqual => BinaryOperator::GreaterEqual,
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Subtract,
        Token::Star => BinaryOperator::Multiply,
        Token::Slash => BinaryOperator::Divide,
        Token::Percent => BinaryOperator::Modulo,
        _ => return None,
    };
    Some(op)
}

/// Precedence of an AST operator, used by the printer to place parentheses.
pub fn operator_precedence(op: BinaryOperator) -> Precedence {
    match op {
        BinaryOperator::Or => Precedence::LogicalOr,
        BinaryOperator::And => Precedence::LogicalAnd,
        BinaryOperator::Equal | BinaryOperator::NotEqual => Precedence::Equality,
        BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => Precedence::Relational,
        BinaryOperator::Add | BinaryOperator::Subtract => Precedence::Additive,
        BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => {
            Precedence::Multiplicative
        }
    }
}
