//! Annotation: discover which nodes of a function are affected by
//! wait-blocks and record it in a [`FlagTable`].
//!
//! Three passes run in order over one function body, accumulating flags:
//!
//! 1. [`waits`]: every wait-block and all of its ancestors get `AWAIT`.
//!    Structural checks that need a single walk (defer placement, value
//!    returns, reserved names, nesting depth) run here too.
//! 2. [`loops`]: every `AWAIT` loop gets `LOOP`.
//! 3. [`jumps`]: every `break`/`continue` targeting a `LOOP` loop gets
//!    `PROPAGATE`, together with the path up to that loop.
//!
//! Nested functions are separate units and are never entered.

mod jumps;
mod loops;
mod waits;

use strand_syntax::ast::{FlagTable, Function, NodeFlags};
use tracing::debug;

use crate::config::TransformConfig;
use crate::error::{TransformError, TransformWarning};

/// Result of annotating one function.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    pub flags: FlagTable,
    pub warnings: Vec<TransformWarning>,
}

impl Annotation {
    /// Whether the function body contains a wait-block.
    pub fn has_wait(&self, func: &Function) -> bool {
        self.flags.has(func.body.id, NodeFlags::AWAIT)
    }
}

/// Annotate `func`, or report every structural error found in it.
pub fn annotate(func: &Function, config: &TransformConfig) -> Result<Annotation, Vec<TransformError>> {
    let mut annotation = Annotation::default();
    let mut errors = Vec::new();

    let depth_ok = waits::mark_waits(func, config, &mut annotation, &mut errors);
    debug!(
        function = %func.display_name(),
        marked = annotation.flags.len(),
        "wait pass done"
    );

    // Passes B and C recurse as deep as the tree; only run them on trees
    // the first pass accepted.
    if depth_ok {
        loops::mark_loops(func, &mut annotation.flags);
        jumps::mark_jumps(func, &mut annotation.flags, &mut errors);
        debug!(
            function = %func.display_name(),
            loops = annotation.flags.ids_with(NodeFlags::LOOP).len(),
            propagate = annotation.flags.ids_with(NodeFlags::PROPAGATE).len(),
            "loop and jump passes done"
        );
    }

    if errors.is_empty() {
        Ok(annotation)
    } else {
        errors.sort_by_key(|e| e.span().start);
        Err(errors)
    }
}
