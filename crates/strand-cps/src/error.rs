//! Error types for the continuation-passing transform.
//!
//! Three layers: structural errors in the input ([`TransformError`]),
//! warnings that do not stop compilation ([`TransformWarning`]) and broken
//! invariants of the transform itself ([`InternalError`]). [`CompileError`]
//! is what the driver hands back, tagged with the function it came from.

use strand_syntax::ast::NodeId;
use strand_syntax::{ParseError, Span};
use thiserror::Error;

use crate::config::Severity;

/// Structural errors detected while annotating a function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// `break` with no enclosing loop
    #[error("'break' outside of a loop")]
    BreakOutsideLoop { span: Span },

    /// `continue` with no enclosing loop
    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop { span: Span },

    /// Labeled jump whose label names no enclosing loop
    #[error("Undefined loop label '{label}'")]
    UndefinedLabel {
        /// Label as written
        label: String,
        span: Span,
    },

    /// `defer(...)` with no enclosing wait-block in the same function
    #[error("'defer' used outside of a wait-block")]
    DeferOutsideWait { span: Span },

    /// Jump inside a wait-block that would leave it
    #[error("'{keyword}' inside a wait-block cannot leave the enclosing loop")]
    JumpOutOfWait {
        /// `break` or `continue`
        keyword: &'static str,
        span: Span,
        /// The wait-block being left
        wait_span: Span,
    },

    /// Labeled jump to an outer loop through a loop that waits
    #[error("'{keyword} {label}' crosses an inner loop that waits")]
    CrossLoopJump {
        keyword: &'static str,
        label: String,
        span: Span,
        /// Innermost loop between the jump and its target
        inner_span: Span,
    },

    /// `return <value>` in a function containing a wait-block
    #[error("Cannot return a value from '{function}', which waits")]
    ReturnValueInWaitingFunction {
        /// Function display name
        function: String,
        span: Span,
    },

    /// Declaration using the prefix reserved for synthesized names
    #[error("Identifier '{name}' uses the reserved prefix '{prefix}'")]
    ReservedIdentifier {
        name: String,
        prefix: String,
        span: Span,
    },

    /// Statement nesting beyond the configured bound
    #[error("Statements nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize, span: Span },
}

impl TransformError {
    pub fn span(&self) -> Span {
        match self {
            TransformError::BreakOutsideLoop { span }
            | TransformError::ContinueOutsideLoop { span }
            | TransformError::UndefinedLabel { span, .. }
            | TransformError::DeferOutsideWait { span }
            | TransformError::JumpOutOfWait { span, .. }
            | TransformError::CrossLoopJump { span, .. }
            | TransformError::ReturnValueInWaitingFunction { span, .. }
            | TransformError::ReservedIdentifier { span, .. }
            | TransformError::NestingTooDeep { span, .. } => *span,
        }
    }

    /// Stable diagnostic code (`E1xxx`).
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::BreakOutsideLoop { .. } => "E1001",
            TransformError::ContinueOutsideLoop { .. } => "E1002",
            TransformError::UndefinedLabel { .. } => "E1003",
            TransformError::DeferOutsideWait { .. } => "E1004",
            TransformError::JumpOutOfWait { .. } => "E1005",
            TransformError::CrossLoopJump { .. } => "E1006",
            TransformError::ReturnValueInWaitingFunction { .. } => "E1007",
            TransformError::ReservedIdentifier { .. } => "E1008",
            TransformError::NestingTooDeep { .. } => "E1009",
        }
    }
}

/// Conditions worth reporting that do not stop compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformWarning {
    #[error("wait-block has no defer() of its own and resumes immediately")]
    EmptyWait { span: Span },
}

impl TransformWarning {
    /// Every warning name accepted in severity overrides.
    pub const NAMES: &'static [&'static str] = &["empty-wait"];

    /// Name used as the key of severity overrides.
    pub fn name(&self) -> &'static str {
        match self {
            TransformWarning::EmptyWait { .. } => "empty-wait",
        }
    }

    /// Stable diagnostic code (`W1xxx`).
    pub fn code(&self) -> &'static str {
        match self {
            TransformWarning::EmptyWait { .. } => "W1001",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TransformWarning::EmptyWait { span } => *span,
        }
    }

    pub fn default_severity(&self) -> Severity {
        Severity::Warn
    }
}

/// A broken invariant of the transform. Never caused by user input that
/// passed annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("marked '{kind}' at {span} has no enclosing rotated loop")]
    PropagateWithoutLoop { kind: &'static str, span: Span },

    #[error("marked {kind} statement {id} is not the last statement of its block")]
    ResidualMark {
        id: NodeId,
        kind: &'static str,
        span: Span,
    },

    #[error("{kind} statement {id} cannot be a split point")]
    UnexpectedPivot {
        id: NodeId,
        kind: &'static str,
        span: Span,
    },

    #[error("{kind} survived rotation")]
    UnloweredNode { kind: &'static str, span: Span },

    #[error("node ids exhausted: the input already uses ids up to {max}")]
    IdsExhausted { max: NodeId, span: Span },
}

impl InternalError {
    pub fn span(&self) -> Span {
        match self {
            InternalError::PropagateWithoutLoop { span, .. }
            | InternalError::ResidualMark { span, .. }
            | InternalError::UnexpectedPivot { span, .. }
            | InternalError::UnloweredNode { span, .. }
            | InternalError::IdsExhausted { span, .. } => *span,
        }
    }

    /// Stable diagnostic code (`E9xxx`).
    pub fn code(&self) -> &'static str {
        match self {
            InternalError::PropagateWithoutLoop { .. } => "E9001",
            InternalError::ResidualMark { .. } => "E9002",
            InternalError::UnexpectedPivot { .. } => "E9003",
            InternalError::UnloweredNode { .. } => "E9004",
            InternalError::IdsExhausted { .. } => "E9005",
        }
    }
}

/// Failure to compile one unit (or to read the source at all).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),

    #[error("{} error(s) in function '{function}'", errors.len())]
    Transform {
        function: String,
        errors: Vec<TransformError>,
    },

    /// Warnings whose severity was raised to `error`
    #[error("{} warning(s) denied in function '{function}'", warnings.len())]
    DeniedWarnings {
        function: String,
        warnings: Vec<TransformWarning>,
    },

    #[error("internal error in function '{function}': {error}")]
    Internal {
        function: String,
        error: InternalError,
    },
}

impl CompileError {
    /// Codes of every diagnostic carried, in report order.
    pub fn codes(&self) -> Vec<&'static str> {
        match self {
            CompileError::Parse(errors) => errors.iter().map(|_| "E0001").collect(),
            CompileError::Transform { errors, .. } => errors.iter().map(|e| e.code()).collect(),
            CompileError::DeniedWarnings { warnings, .. } => {
                warnings.iter().map(|w| w.code()).collect()
            }
            CompileError::Internal { error, .. } => vec![error.code()],
        }
    }
}

/// Invalid transform configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid transform configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Reserved prefix '{0}' is not a valid identifier prefix")]
    InvalidPrefix(String),

    #[error("Runtime name '{0}' is not a valid identifier")]
    InvalidRuntimeName(String),

    #[error("max_depth must be at least 1")]
    ZeroDepth,

    #[error("Unknown warning '{0}' in severity overrides")]
    UnknownWarning(String),
}
