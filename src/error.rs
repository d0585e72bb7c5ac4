use thiserror::Error;

// Unified error type for pipecg.
//
// The engines never fail on numeric grounds unless a check is switched on in
// `PipeOptions`; NaN and inf otherwise flow through the recurrence untouched.

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipeError {
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    InvalidDimension {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("singular pivot at iteration {iteration}: {quantity} vanished")]
    SingularPivot {
        iteration: usize,
        quantity: &'static str,
    },
    #[error("iteration budget must produce at least one generation")]
    InvalidIterationBudget,
    #[error("preconditioner error: {0}")]
    Preconditioner(String),
    #[error("unknown variant tag `{0}` (expected one of p, pr, p_m, pr_m)")]
    UnknownVariant(String),
}

impl PipeError {
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::InvalidDimension { context, expected, found }
    }

    pub fn singular(iteration: usize, quantity: &'static str) -> Self {
        Self::SingularPivot { iteration, quantity }
    }
}
