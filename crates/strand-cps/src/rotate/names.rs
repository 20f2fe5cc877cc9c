//! Synthesized names.
//!
//! One counter per compile call. A wait-block or loop takes a single number
//! for all the names it introduces, so `__loop3` restarts through `__next3`.

/// Routine names of one lowered loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopNames {
    /// Runs one iteration (test included)
    pub restart: String,
    /// Runs the update step, then `restart`
    pub next: String,
}

#[derive(Debug, Clone)]
pub struct NameGen {
    prefix: String,
    next: u32,
}

impl NameGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    fn fresh(&mut self, stem: &str) -> (String, u32) {
        let n = self.next;
        self.next += 1;
        (format!("{}{}{}", self.prefix, stem, n), n)
    }

    /// `__kN`
    pub fn continuation(&mut self) -> String {
        self.fresh("k").0
    }

    /// `__deferralsN`
    pub fn counter(&mut self) -> String {
        self.fresh("deferrals").0
    }

    /// `__loopN` / `__nextN`
    pub fn loop_routines(&mut self) -> LoopNames {
        let (restart, n) = self.fresh("loop");
        LoopNames {
            restart,
            next: format!("{}next{}", self.prefix, n),
        }
    }

    /// Positional parameter of a defer assignment callback, `__aI`.
    pub fn argument(&self, index: usize) -> String {
        format!("{}a{}", self.prefix, index)
    }
}
