//! Parser guards to prevent infinite loops and stack overflow

use super::ParseError;
use crate::token::Span;

/// Maximum iterations for any parser loop
const MAX_LOOP_ITERATIONS: usize = 100_000;

/// Maximum nesting depth before rejecting parse
///
/// Statements and expressions share one counter. Lowered code nests far
/// deeper than its source, so the transform has its own, separate bound.
pub const MAX_PARSE_DEPTH: usize = 64;

/// Guard against infinite loops in parser
///
/// Tracks iteration count and returns error if exceeded.
///
/// # Example
///
/// ```ignore
/// let mut guard = LoopGuard::new("block");
/// while !parser.check(&Token::RightBrace) {
///     guard.check(parser.current_span())?;
///     // ... parse a statement ...
/// }
/// ```
pub struct LoopGuard {
    name: &'static str,
    count: usize,
    max: usize,
}

impl LoopGuard {
    /// Create a new loop guard with default limit
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            count: 0,
            max: MAX_LOOP_ITERATIONS,
        }
    }

    /// Create a loop guard with custom limit
    #[inline]
    pub fn with_limit(name: &'static str, max: usize) -> Self {
        Self { name, count: 0, max }
    }

    /// Check iteration count, return error if exceeded
    #[inline]
    pub fn check(&mut self, span: Span) -> Result<(), ParseError> {
        self.count += 1;
        if self.count > self.max {
            return Err(ParseError::parser_limit_exceeded(
                format!("Loop '{}' exceeded {} iterations", self.name, self.max),
                span,
            ));
        }
        Ok(())
    }
}

/// Nesting depth counter owned by the parser.
///
/// Unlike an RAII guard this does not borrow the parser, so recursive
/// descent can keep using `&mut Parser` between `enter` and `exit`.
#[derive(Debug, Default)]
pub struct DepthCounter {
    depth: usize,
}

impl DepthCounter {
    pub fn enter(&mut self, name: &'static str, span: Span) -> Result<(), ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(ParseError::parser_limit_exceeded(
                format!("Maximum nesting depth ({}) exceeded in {}", MAX_PARSE_DEPTH, name),
                span,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn current(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_guard_exceeds_limit() {
        let mut guard = LoopGuard::with_limit("test", 10);
        for _ in 0..10 {
            assert!(guard.check(Span::default()).is_ok());
        }
        // 11th iteration should fail
        assert!(guard.check(Span::default()).is_err());
    }

    #[test]
    fn test_depth_counter_balances() {
        let mut depth = DepthCounter::default();
        for _ in 0..10 {
            depth.enter("test", Span::default()).unwrap();
        }
        for _ in 0..10 {
            depth.exit();
        }
        assert_eq!(depth.current(), 0);
    }

    #[test]
    fn test_depth_counter_exceeds_limit() {
        let mut depth = DepthCounter::default();
        for _ in 0..MAX_PARSE_DEPTH {
            depth.enter("test", Span::default()).unwrap();
        }
        assert!(depth.enter("test", Span::default()).is_err());
        // Should not have incremented
        assert_eq!(depth.current(), MAX_PARSE_DEPTH);
    }
}
