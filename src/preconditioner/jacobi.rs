// Jacobi preconditioner implementation

use crate::core::traits::{Indexing, MatVec};
use crate::error::PipeError;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Jacobi preconditioner: M = D⁻¹
#[derive(Clone, Debug)]
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Float> Jacobi<T> {
    /// new with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }

    /// Build directly from the diagonal of A. Zero entries are left unscaled (inverse 0).
    pub fn from_diagonal(diag: &[T]) -> Self {
        Self {
            inv_diag: diag.iter().map(|&d| invert(d)).collect(),
        }
    }

    pub fn inv_diag(&self) -> &[T] {
        &self.inv_diag
    }
}

impl<T: Float> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn invert<T: Float>(d: T) -> T {
    if d != T::zero() { T::one() / d } else { T::zero() }
}

impl<M, T> Preconditioner<M, Vec<T>> for Jacobi<T>
where
    M: MatVec<Vec<T>> + Indexing,
    T: Float,
{
    /// Probe the diagonal through unit-vector products; works for any operator.
    fn setup(&mut self, a: &M) -> Result<(), PipeError> {
        let n = a.nrows();
        let mut e = vec![T::zero(); n];
        let mut col = vec![T::zero(); n];
        let mut inv_diag = Vec::with_capacity(n);
        for i in 0..n {
            e[i] = T::one();
            a.matvec(&e, &mut col);
            e[i] = T::zero();
            inv_diag.push(invert(col[i]));
        }
        self.inv_diag = inv_diag;
        Ok(())
    }

    fn apply(&self, r: &Vec<T>, z: &mut Vec<T>) -> Result<(), PipeError> {
        if self.inv_diag.len() != r.len() || z.len() != r.len() {
            return Err(PipeError::Preconditioner(format!(
                "jacobi: diagonal of length {} applied to vector of length {}",
                self.inv_diag.len(),
                r.len()
            )));
        }
        for ((zi, &ri), &di) in z.iter_mut().zip(r).zip(&self.inv_diag) {
            *zi = di * ri;
        }
        Ok(())
    }
}
