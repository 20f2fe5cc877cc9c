//! Token definitions for the Strand surface language.
//!
//! This module defines all tokens that can appear in Strand source code,
//! including keywords, operators, literals, and special tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A token in the Strand surface language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Declarations
    Function,
    Let,

    // Control flow
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,

    // Wait/defer
    Wait,
    Defer,

    // Literals
    IntLiteral(i64),
    StringLiteral(String),
    True,
    False,
    Null,

    /// Identifier (variable, function, label)
    Identifier(String),

    // Operators
    EqualEqual,
    BangEqual,
    LessEqual,
    GreaterEqual,
    AmpAmp,
    PipePipe,
    Less,
    Greater,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Equal,

    // Punctuation
    Dot,
    Colon,
    Semicolon,
    Comma,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    /// End of input
    Eof,
}

impl Token {
    /// Whether this token can begin a statement (used by error recovery).
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            Token::Function
                | Token::Let
                | Token::If
                | Token::Switch
                | Token::For
                | Token::While
                | Token::Do
                | Token::Break
                | Token::Continue
                | Token::Return
                | Token::Wait
        )
    }

    /// Source text of a reserved word, `None` for every other token.
    pub fn keyword(&self) -> Option<&'static str> {
        let word = match self {
            Token::Function => "function",
            Token::Let => "let",
            Token::If => "if",
            Token::Else => "else",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::For => "for",
            Token::While => "while",
            Token::Do => "do",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Return => "return",
            Token::Wait => "wait",
            Token::Defer => "defer",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            _ => return None,
        };
        Some(word)
    }
}

/// Source location of a token or node.
///
/// `start`/`end` are byte offsets; `line`/`column` are 1-based and point at
/// `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn merge(&self, other: &Span) -> Span {
        let (line, column) = if self.start <= other.start {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Function => write!(f, "function"),
            Token::Let => write!(f, "let"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::Switch => write!(f, "switch"),
            Token::Case => write!(f, "case"),
            Token::Default => write!(f, "default"),
            Token::For => write!(f, "for"),
            Token::While => write!(f, "while"),
            Token::Do => write!(f, "do"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::Return => write!(f, "return"),
            Token::Wait => write!(f, "wait"),
            Token::Defer => write!(f, "defer"),
            Token::IntLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "\"{}\"", s),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::EqualEqual => write!(f, "=="),
            Token::BangEqual => write!(f, "!="),
            Token::LessEqual => write!(f, "<="),
            Token::GreaterEqual => write!(f, ">="),
            Token::AmpAmp => write!(f, "&&"),
            Token::PipePipe => write!(f, "||"),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Bang => write!(f, "!"),
            Token::Equal => write!(f, "="),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Eof => write!(f, "end of file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge_keeps_earliest_position() {
        let a = Span::new(10, 14, 2, 3);
        let b = Span::new(0, 4, 1, 1);
        let merged = a.merge(&b);
        assert_eq!(merged, Span::new(0, 14, 1, 1));
    }

    #[test]
    fn test_statement_starters() {
        assert!(Token::Wait.starts_statement());
        assert!(Token::Do.starts_statement());
        assert!(!Token::Defer.starts_statement());
        assert!(!Token::Semicolon.starts_statement());
    }

    #[test]
    fn test_keyword_text() {
        assert_eq!(Token::Defer.keyword(), Some("defer"));
        assert_eq!(Token::Wait.keyword(), Some("wait"));
        assert_eq!(Token::Identifier("x".into()).keyword(), None);
        assert_eq!(Token::Dot.keyword(), None);
    }
}
