//! Scaled vector updates shared by both pipelined engines.
//!
//! Every helper allocates a fresh output vector: an engine step never mutates the
//! previous generation. The element expression is fixed (`x + a*y`, `x - a*y`) so the
//! rounding of each update is the same in every variant.

use crate::core::traits::MatVec;
use crate::error::PipeError;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Returns `x + a * y`.
pub fn add_scaled<T: Float>(x: &[T], a: T, y: &[T]) -> Vec<T> {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(&xi, &yi)| xi + a * yi).collect()
}

/// Returns `x - a * y`.
pub fn sub_scaled<T: Float>(x: &[T], a: T, y: &[T]) -> Vec<T> {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(&xi, &yi)| xi - a * yi).collect()
}

/// Returns `b - A x`.
pub fn residual<M, T>(a: &M, b: &[T], x: &Vec<T>) -> Vec<T>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float,
{
    let ax = apply(a, x);
    b.iter().zip(&ax).map(|(&bi, &axi)| bi - axi).collect()
}

/// Returns a fresh `A x`.
pub fn apply<M, T>(a: &M, x: &Vec<T>) -> Vec<T>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float,
{
    let mut y = vec![T::zero(); x.len()];
    a.matvec(x, &mut y);
    y
}

/// Returns a fresh `M r`; `None` is the identity.
pub fn precondition<M, T>(
    pc: Option<&dyn Preconditioner<M, Vec<T>>>,
    r: &Vec<T>,
) -> Result<Vec<T>, PipeError>
where
    T: Float,
{
    match pc {
        Some(pc) => {
            let mut z = vec![T::zero(); r.len()];
            pc.apply(r, &mut z)?;
            Ok(z)
        }
        None => Ok(r.clone()),
    }
}
