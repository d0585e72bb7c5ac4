//! Pipelined CG engines and their shared interfaces.

use crate::error::PipeError;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// What a run reports back: the resolved variant name and the iteration budget.
///
/// Per-iteration values are only visible to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipeStats {
    pub name: String,
    pub max_iter: usize,
}

/// Common interface for both engines.
pub trait LinearSolver<M, V> {
    type Error;
    /// Run the recurrence on A·x = b; `x` holds the initial guess on entry and the
    /// final iterate on return.
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<PipeStats, Self::Error>;
}

pub mod named;
pub mod observer;
pub mod pipe_cg;
pub mod pipe_pcg;
pub mod state;
pub mod variant;

pub use named::*;
pub use observer::Observer;
pub use pipe_cg::PipeCgSolver;
pub use pipe_pcg::PipePcgSolver;
pub use state::{CgGeneration, Generation, PcgGeneration, PipeCgState, PipePcgState, PipeState};
pub use variant::Variant;

/// The recurrence prediction of `ν_k` from generation `k-1`.
pub(crate) fn predict_nu<T: Float>(nu1: T, alpha1: T, delta1: T, gamma1: T, variant: Variant) -> T {
    if variant.meurant() {
        -nu1 + alpha1 * alpha1 * gamma1
    } else {
        let two = T::one() + T::one();
        nu1 - two * alpha1 * delta1 + alpha1 * alpha1 * gamma1
    }
}

pub(crate) fn check_inputs<T>(b: &[T], x: &[T], max_iter: usize) -> Result<(), PipeError> {
    if x.len() != b.len() {
        return Err(PipeError::dimension_mismatch("initial guess", b.len(), x.len()));
    }
    if max_iter == 0 {
        return Err(PipeError::InvalidIterationBudget);
    }
    Ok(())
}

/// `μ` must be non-zero and finite before it divides `ν`.
pub(crate) fn check_mu<T: Float>(k: usize, mu: T) -> Result<(), PipeError> {
    if mu == T::zero() || !mu.is_finite() {
        return Err(PipeError::singular(k, "mu"));
    }
    Ok(())
}

pub(crate) fn check_nu_prev<T: Float>(k: usize, nu_prev: T) -> Result<(), PipeError> {
    if nu_prev == T::zero() || !nu_prev.is_finite() {
        return Err(PipeError::singular(k, "nu"));
    }
    Ok(())
}

pub(crate) fn as_f64<T: Float>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

/// Logs once per run when the step size stops being finite.
pub(crate) fn warn_nonfinite<T: Float>(warned: &mut bool, name: &str, k: usize, alpha: T) {
    if !*warned && !alpha.is_finite() {
        log::warn!("{name}: step size alpha became non-finite at iteration {k}");
        *warned = true;
    }
}
