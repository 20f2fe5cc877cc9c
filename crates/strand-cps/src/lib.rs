//! Strand continuation-passing transform
//!
//! Rewrites functions that use `wait { ... }` blocks and `defer(...)`
//! callbacks into plain continuation-passing code that calls a deferral
//! counter runtime:
//!
//! - [`annotate`]: mark nodes affected by wait-blocks
//! - [`hoist`]: lift `let` declarations of waiting functions
//! - [`rotate`]: split marked blocks into continuation routines
//! - [`verify`]: check the rotated output
//!
//! [`Compiler`] runs these per function; nested functions are compiled as
//! independent units first.
//!
//! ```
//! use strand_cps::Compiler;
//!
//! let out = Compiler::new()
//!     .compile_source("function f() { wait { setTimeout(defer(), 10); } done(); }")
//!     .unwrap();
//! assert!(out.warnings.is_empty());
//! ```

pub mod annotate;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod hoist;
pub mod rotate;
pub mod verify;

pub use config::{RuntimeNames, Severity, TransformConfig};
pub use diagnostic::{Diagnostic, ErrorCode};
pub use error::{CompileError, ConfigError, InternalError, TransformError, TransformWarning};

use strand_syntax::ast::*;
use tracing::{debug, instrument, trace, warn};

use crate::rotate::{NameGen, Rotator};

/// A compiled value and the warnings reported while compiling it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutput<T> {
    pub output: T,
    pub warnings: Vec<TransformWarning>,
}

/// The wait/defer transform. Holds only configuration, so one instance can
/// be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: TransformConfig,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler for a configuration built in code; it is validated the same
    /// way [`TransformConfig::from_toml_str`] validates a file.
    pub fn with_config(config: TransformConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Parse and compile a source file.
    pub fn compile_source(&self, source: &str) -> Result<CompileOutput<Module>, Vec<CompileError>> {
        let module = strand_syntax::parse_module(source).map_err(|errors| vec![CompileError::Parse(errors)])?;
        self.compile_module(module)
    }

    /// Compile every function of `module`. Errors of all functions are
    /// collected.
    pub fn compile_module(&self, module: Module) -> Result<CompileOutput<Module>, Vec<CompileError>> {
        let Module { functions, span } = module;
        let original_max = functions.iter().map(|f| f.max_id()).max().unwrap_or(NodeId(0));
        let mut session = Session::new(&self.config, original_max);

        let mut compiled = Vec::with_capacity(functions.len());
        for mut func in functions {
            session.compile_unit(&mut func, 0);
            compiled.push(func);
        }
        session.finish(Module::new(compiled, span))
    }

    /// Compile a single function and the functions nested in it.
    pub fn compile_function(&self, func: Function) -> Result<CompileOutput<Function>, Vec<CompileError>> {
        let mut func = func;
        let mut session = Session::new(&self.config, func.max_id());
        session.compile_unit(&mut func, 0);
        session.finish(func)
    }
}

/// State of one compile call: id and name allocation, collected results.
struct Session<'c> {
    config: &'c TransformConfig,
    original_max: NodeId,
    ids: NodeIdGen,
    names: NameGen,
    warnings: Vec<TransformWarning>,
    errors: Vec<CompileError>,
}

impl<'c> Session<'c> {
    fn new(config: &'c TransformConfig, original_max: NodeId) -> Self {
        Self {
            config,
            original_max,
            ids: NodeIdGen::after(original_max),
            names: NameGen::new(config.reserved_prefix.as_str()),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn finish<T>(self, output: T) -> Result<CompileOutput<T>, Vec<CompileError>> {
        if self.errors.is_empty() {
            Ok(CompileOutput {
                output,
                warnings: self.warnings,
            })
        } else {
            Err(self.errors)
        }
    }

    /// Compile `func` in place, nested functions first.
    #[instrument(level = "debug", skip_all, fields(function = %func.display_name()))]
    fn compile_unit(&mut self, func: &mut Function, nesting: usize) {
        if nesting >= self.config.max_depth {
            self.errors.push(CompileError::Transform {
                function: func.display_name().to_string(),
                errors: vec![TransformError::NestingTooDeep {
                    limit: self.config.max_depth,
                    span: func.span,
                }],
            });
            return;
        }

        let mut nested = NestedUnits {
            session: &mut *self,
            nesting: nesting + 1,
        };
        nested.visit_block_mut(&mut func.body);

        if let Err(error) = self.transform(func) {
            self.errors.push(error);
        }
    }

    fn transform(&mut self, func: &mut Function) -> Result<(), CompileError> {
        let function = func.display_name().to_string();
        let annotation = annotate::annotate(func, self.config).map_err(|errors| CompileError::Transform {
            function: function.clone(),
            errors,
        })?;

        let mut denied = Vec::new();
        for warning in annotation.warnings.iter().cloned() {
            match self
                .config
                .effective_severity(warning.name(), warning.default_severity())
            {
                Severity::Off => {}
                Severity::Warn => {
                    warn!(function = %function, code = warning.code(), "{}", warning);
                    self.warnings.push(warning);
                }
                Severity::Error => denied.push(warning),
            }
        }
        if !denied.is_empty() {
            return Err(CompileError::DeniedWarnings {
                function,
                warnings: denied,
            });
        }

        if !annotation.has_wait(func) {
            debug!(function = %function, "no wait-blocks, unchanged");
            return Ok(());
        }

        let hoisted = hoist::hoist_declarations(func, &mut self.ids);
        debug!(function = %function, hoisted = hoisted.len(), "declarations hoisted");

        Rotator::new(&annotation.flags, self.config, &mut self.ids, &mut self.names)
            .rotate_function(func)
            .map_err(|error| CompileError::Internal {
                function: function.clone(),
                error,
            })?;
        if self.ids.is_exhausted() {
            return Err(CompileError::Internal {
                function,
                error: InternalError::IdsExhausted {
                    max: self.original_max,
                    span: func.span,
                },
            });
        }
        trace!(function = %function, "rotated:\n{}", strand_syntax::printer::print_function(func));

        if self.config.verify {
            verify::verify_rotation(func, &annotation.flags, self.original_max)
                .map_err(|error| CompileError::Internal { function, error })?;
        }
        Ok(())
    }
}

/// Compiles every function declared or written as an expression directly
/// inside the current unit.
struct NestedUnits<'s, 'c> {
    session: &'s mut Session<'c>,
    nesting: usize,
}

impl VisitorMut for NestedUnits<'_, '_> {
    fn visit_function_mut(&mut self, func: &mut Function) {
        self.session.compile_unit(func, self.nesting);
    }
}
