//! Diagnostic infrastructure for error reporting
//!
//! Turns transform errors, warnings and internal errors into labeled
//! reports with source context, rendered to the terminal or as JSON.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strand_syntax::{ParseError, Span};

use crate::error::{CompileError, InternalError, TransformError, TransformWarning};

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    /// Error code (e.g., "E1001")
    code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Diagnostic for a broken transform invariant
    pub fn bug(message: impl Into<String>) -> Self {
        Self::new(Severity::Bug, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code.clone());
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        self.inner
            .labels
            .push(Label::primary(file_id, span.start..span.end).with_message(message));
        self
    }

    /// Add a secondary label (related location)
    pub fn with_secondary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        self.inner
            .labels
            .push(Label::secondary(file_id, span.start..span.end).with_message(message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    pub fn severity(&self) -> Severity {
        self.inner.severity
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Create diagnostic from a TransformError
    pub fn from_transform_error(error: &TransformError, file_id: usize) -> Self {
        use TransformError::*;

        let diag = Diagnostic::error(error.to_string()).with_code(ErrorCode(error.code()));
        match error {
            BreakOutsideLoop { span } | ContinueOutsideLoop { span } => {
                diag.with_primary_label(file_id, *span, "not inside a loop")
            }

            UndefinedLabel { span, .. } => diag
                .with_primary_label(file_id, *span, "no enclosing loop has this label"),

            DeferOutsideWait { span } => diag
                .with_primary_label(file_id, *span, "not inside a wait-block")
                .with_help("wrap the asynchronous call in `wait { ... }`"),

            JumpOutOfWait { span, wait_span, .. } => diag
                .with_primary_label(file_id, *span, "jumps out of the wait-block")
                .with_secondary_label(file_id, *wait_span, "wait-block entered here")
                .with_note("a wait-block body runs to completion before its continuation"),

            CrossLoopJump { span, inner_span, .. } => diag
                .with_primary_label(file_id, *span, "jump to an outer loop")
                .with_secondary_label(file_id, *inner_span, "crosses this loop")
                .with_help("restructure so the jump targets its nearest enclosing loop"),

            ReturnValueInWaitingFunction { span, .. } => diag
                .with_primary_label(file_id, *span, "value would be lost")
                .with_note("the caller resumes at the first wait-block")
                .with_help("pass the result to a callback parameter instead"),

            ReservedIdentifier { span, prefix, .. } => diag
                .with_primary_label(file_id, *span, "reserved for synthesized names")
                .with_help(format!("rename it so it does not start with '{}'", prefix)),

            NestingTooDeep { span, .. } => {
                diag.with_primary_label(file_id, *span, "nesting limit reached here")
            }
        }
    }

    /// Create diagnostic from a warning, at the severity it is reported with
    pub fn from_warning(warning: &TransformWarning, file_id: usize, deny: bool) -> Self {
        let diag = if deny {
            Diagnostic::error(warning.to_string())
        } else {
            Diagnostic::warning(warning.to_string())
        };
        match warning {
            TransformWarning::EmptyWait { span } => diag
                .with_code(ErrorCode(warning.code()))
                .with_primary_label(file_id, *span, "no defer() in this block")
                .with_note(format!(
                    "silence with `{} = \"off\"` under [transform.severity]",
                    warning.name()
                )),
        }
    }

    /// Create diagnostic from an InternalError
    pub fn from_internal_error(error: &InternalError, file_id: usize) -> Self {
        Diagnostic::bug(error.to_string())
            .with_code(ErrorCode(error.code()))
            .with_primary_label(file_id, error.span(), "while rotating this")
            .with_note("this is a bug in the transform, not in the input")
    }

    pub fn from_parse_error(error: &ParseError, file_id: usize) -> Self {
        let mut diag = Diagnostic::error(error.message.clone())
            .with_code(ErrorCode("E0001"))
            .with_primary_label(file_id, error.span, "here");
        if let Some(suggestion) = &error.suggestion {
            diag = diag.with_help(suggestion.clone());
        }
        diag
    }

    /// Every diagnostic carried by a CompileError.
    pub fn from_compile_error(error: &CompileError, file_id: usize) -> Vec<Self> {
        match error {
            CompileError::Parse(errors) => errors
                .iter()
                .map(|e| Self::from_parse_error(e, file_id))
                .collect(),
            CompileError::Transform { errors, .. } => errors
                .iter()
                .map(|e| Self::from_transform_error(e, file_id))
                .collect(),
            CompileError::DeniedWarnings { warnings, .. } => warnings
                .iter()
                .map(|w| Self::from_warning(w, file_id, true))
                .collect(),
            CompileError::Internal { error, .. } => vec![Self::from_internal_error(error, file_id)],
        }
    }

    /// Emit the diagnostic to stderr with colors
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic (for testing/custom rendering)
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for IDE integration
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label (1-indexed positions)
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: Option<String>,
    /// "primary" or "secondary"
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;

                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}
