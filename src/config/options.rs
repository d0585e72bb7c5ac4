//! Run options for the pipelined engines.
//!
//! This module provides the `PipeOptions` struct, which bundles the variant, the iteration
//! budget and the opt-in validation switches. Both engines can be built from it
//! (`PipeCgSolver::from_options`, `PipePcgSolver::from_options`). With the checks left off,
//! a run performs no validation at all and NaN/inf propagate through the recurrence.

use crate::solver::variant::Variant;

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeOptions {
    /// Which of the four recurrences to run.
    pub variant: Variant,

    /// Total generations produced, including generation 0.
    pub max_iter: usize,

    /// Reject mismatched `b`/`x` lengths and a zero budget up front.
    pub check_dimensions: bool,

    /// Fail with `SingularPivot` instead of dividing by a vanished `μ` or `ν`.
    pub check_pivots: bool,
}

impl PipeOptions {
    pub fn new(variant: Variant, max_iter: usize) -> Self {
        Self { variant, max_iter, ..Self::default() }
    }

    /// Switch every opt-in check on or off.
    pub fn with_checks(mut self, flag: bool) -> Self {
        self.check_dimensions = flag;
        self.check_pivots = flag;
        self
    }
}

impl Default for PipeOptions {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            max_iter: 100,
            check_dimensions: false,
            check_pivots: false,
        }
    }
}
