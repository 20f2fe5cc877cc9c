//! Error recovery strategies for the parser.
//!
//! When the parser encounters an error, it uses these strategies to
//! resynchronize and continue parsing to find more errors.

use super::Parser;
use crate::token::Token;

/// Synchronize to the next statement boundary.
///
/// This is used after encountering a parse error to skip tokens until
/// we reach a point where statement parsing can resume.
pub fn sync_to_statement_boundary(parser: &mut Parser) {
    while !parser.at_eof() {
        match parser.current() {
            // Found a statement start, stop skipping
            tok if tok.starts_statement() => return,

            // Semicolon marks end of previous statement
            Token::Semicolon => {
                parser.advance();
                return;
            }

            // Closing brace might end a block
            Token::RightBrace => return,

            // Keep skipping
            _ => {
                parser.advance();
            }
        }
    }
}

/// Synchronize to the next top-level `function` keyword.
pub fn sync_to_function(parser: &mut Parser) {
    // Always make progress past the offending token
    parser.advance();
    while !parser.at_eof() && !parser.check(&Token::Function) {
        parser.advance();
    }
}
