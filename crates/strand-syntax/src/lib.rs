//! Strand syntax
//!
//! Syntax tree, node marks, lexer, parser and printer for the Strand
//! wait/defer language. The tree is the input and output of the
//! continuation-passing transform in `strand-cps`; hosts with their own
//! front end can build it directly or exchange it as JSON.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token};

/// Lex and parse a source file.
pub fn parse_module(source: &str) -> Result<ast::Module, Vec<ParseError>> {
    let parser = Parser::new(source)
        .map_err(|errors| errors.into_iter().map(ParseError::from).collect::<Vec<_>>())?;
    parser.parse()
}
