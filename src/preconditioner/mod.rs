//! Preconditioners for the pipelined engines.
//!
//! This module defines the Preconditioner trait together with the identity, Jacobi and
//! closure-backed implementations.

use crate::core::wrappers::FnOp;
use crate::error::PipeError;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<M, V> {
    /// Apply M to r, writing z = M r.
    fn apply(&self, r: &V, z: &mut V) -> Result<(), PipeError>;
    /// Optionally: setup/factorize from A.
    fn setup(&mut self, _a: &M) -> Result<(), PipeError> {
        Ok(())
    }
}

pub mod jacobi;

pub use jacobi::Jacobi;

/// The identity preconditioner; recovers the unpreconditioned recurrence.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<M, T: Copy> Preconditioner<M, Vec<T>> for Identity {
    fn apply(&self, r: &Vec<T>, z: &mut Vec<T>) -> Result<(), PipeError> {
        if r.len() != z.len() {
            return Err(PipeError::Preconditioner(format!(
                "identity: input length {} != output length {}",
                r.len(),
                z.len()
            )));
        }
        z.copy_from_slice(r);
        Ok(())
    }
}

impl<M, T: Copy, F> Preconditioner<M, Vec<T>> for FnOp<F>
where
    F: Fn(&[T]) -> Vec<T>,
{
    fn apply(&self, r: &Vec<T>, z: &mut Vec<T>) -> Result<(), PipeError> {
        let out = (self.0)(r);
        if out.len() != z.len() {
            return Err(PipeError::Preconditioner(format!(
                "closure returned {} entries, expected {}",
                out.len(),
                z.len()
            )));
        }
        z.copy_from_slice(&out);
        Ok(())
    }
}
