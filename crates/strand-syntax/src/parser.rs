//! Parser for the Strand surface language
//!
//! This module implements a recursive descent parser that transforms
//! a token stream from the lexer into an Abstract Syntax Tree (AST).
//! Node ids are allocated in source order.

pub mod error;
pub mod expr;
pub mod guards;
pub mod precedence;
pub mod recovery;
pub mod stmt;

use crate::ast::*;
use crate::lexer::{LexError, Lexer};
use crate::token::{Span, Token};

pub use error::{ParseError, ParseErrorKind};
use guards::DepthCounter;

/// Parser state for the Strand language.
///
/// Recursive descent with 2-token lookahead (LL(2)), needed to tell a
/// labeled loop (`outer: while ...`) from an expression statement.
pub struct Parser {
    /// Pre-tokenized input, always terminated by `Token::Eof`
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,

    ids: NodeIdGen,

    depth: DepthCounter,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;

        Ok(Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            ids: NodeIdGen::new(),
            depth: DepthCounter::default(),
        })
    }

    /// Parse the entire source file into a Module AST.
    ///
    /// Returns the Module on success, or all accumulated errors on failure.
    pub fn parse(mut self) -> Result<Module, Vec<ParseError>> {
        let start_span = self.current_span();
        let mut functions = Vec::new();

        while !self.at_eof() {
            match self.parse_function_declaration() {
                Ok(func) => functions.push(func),
                Err(err) => {
                    self.errors.push(err);
                    recovery::sync_to_function(&mut self);
                }
            }
        }

        let span = match functions.last() {
            Some(last) => self.combine_spans(&start_span, &last.span),
            None => start_span,
        };

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        Ok(Module { functions, span })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Peek at the next token (lookahead).
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(tok, _)| tok)
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        if self.pos == 0 {
            self.current_span()
        } else {
            self.tokens[self.pos - 1].1
        }
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Check if we've reached EOF.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Consume the current token if it matches the expected kind.
    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Consume the current token if it matches; report whether it did.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume an identifier token.
    pub fn expect_identifier(&mut self) -> Result<Identifier, ParseError> {
        let span = self.current_span();
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(Identifier::new(name, span))
            }
            _ => Err(self.unexpected_token(&[Token::Identifier(String::new())])),
        }
    }

    /// Property name after `.`; reserved words are allowed here, so the
    /// runtime's `counter.defer(...)` and `counter.wait(k)` read back.
    pub fn expect_property_name(&mut self) -> Result<Identifier, ParseError> {
        let span = self.current_span();
        match self.current().keyword() {
            Some(word) => {
                self.advance();
                Ok(Identifier::new(word, span))
            }
            None => self.expect_identifier(),
        }
    }

    // ========================================================================
    // Node ids and nesting depth
    // ========================================================================

    pub fn next_id(&mut self) -> NodeId {
        self.ids.fresh()
    }

    pub fn enter(&mut self, name: &'static str) -> Result<(), ParseError> {
        let span = self.current_span();
        self.depth.enter(name, span)
    }

    pub fn exit(&mut self) {
        self.depth.exit();
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Record a parse error and keep going.
    pub fn record(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    /// Create an "unexpected token" error.
    pub fn unexpected_token(&self, expected: &[Token]) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected.to_vec(), span)
        } else {
            ParseError::unexpected_token(expected.to_vec(), self.current().clone(), span)
        }
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// Combine two spans into a single span.
    pub fn combine_spans(&self, start: &Span, end: &Span) -> Span {
        Span {
            start: start.start,
            end: end.end,
            line: start.line,
            column: start.column,
        }
    }

    /// Span from `start` to the last consumed token.
    pub fn span_from(&self, start: &Span) -> Span {
        let end = self.previous_span();
        self.combine_spans(start, &end)
    }

    fn parse_function_declaration(&mut self) -> Result<Function, ParseError> {
        stmt::parse_function(self, true)
    }

    /// Synchronize to the next statement boundary after an error.
    fn sync_to_statement_boundary(&mut self) {
        recovery::sync_to_statement_boundary(self)
    }
}
