//! Operator and inner-product implementations for faer matrices, vectors and closures.
//!
//! This module wires `faer::Mat`, `faer::MatRef`, plain `Vec<T>` and arbitrary closures into the
//! core traits, so the pipelined engines can be driven by a dense matrix, a sparse matrix or any
//! user-supplied "vector in, vector out" callable.
//!
//! # Reproducibility
//! Inner products reduce over fixed-size chunks and add the per-chunk partial sums in chunk order.
//! With the `rayon` feature the chunks are summed in parallel, without it serially; either way the
//! summation tree is the same, so a run is bit-for-bit reproducible regardless of thread count or
//! feature selection. The predict/recompute comparison depends on that.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use crate::core::traits::{Indexing, InnerProduct, MatVec};
use faer::{Mat, MatRef};
use num_traits::Float;

/// Number of entries reduced serially before partial sums are combined.
pub const DOT_CHUNK: usize = 4096;

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Float> MatVec<Vec<T>> for Mat<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        self.as_ref().matvec(x, y);
    }
}

/// Implements matrix-vector multiplication for a matrix reference (`faer::MatRef`).
impl<'a, T: Float> MatVec<Vec<T>> for MatRef<'a, T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for (i, yi) in y.iter_mut().enumerate() {
            let mut acc = T::zero();
            for (j, &xj) in x.iter().enumerate() {
                acc = acc + self[(i, j)] * xj;
            }
            *yi = acc;
        }
    }
}

fn chunk_dot<T: Float>(x: &[T], y: &[T]) -> T {
    x.iter()
        .zip(y.iter())
        .fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi)
}

/// Implements inner product and norm for vectors, with optional Rayon parallelism.
impl<T: Float + Send + Sync> InnerProduct<Vec<T>> for () {
    type Scalar = T;

    /// Computes the dot product of two vectors: `x^T y`.
    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        if x.len() <= DOT_CHUNK {
            return chunk_dot(x, y);
        }
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            let partials: Vec<T> = x
                .par_chunks(DOT_CHUNK)
                .zip(y.par_chunks(DOT_CHUNK))
                .map(|(xc, yc)| chunk_dot(xc, yc))
                .collect();
            partials.into_iter().fold(T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.chunks(DOT_CHUNK)
                .zip(y.chunks(DOT_CHUNK))
                .map(|(xc, yc)| chunk_dot(xc, yc))
                .fold(T::zero(), |acc, v| acc + v)
        }
    }

    /// Computes the Euclidean norm of a vector: `||x||_2`.
    fn norm(&self, x: &Vec<T>) -> T {
        self.dot(x, x).sqrt()
    }
}

/// Adapter turning a closure `Fn(&[T]) -> Vec<T>` into an operator or preconditioner.
///
/// ```rust
/// use pipecg::core::{FnOp, MatVec};
/// let double = FnOp::new(|v: &[f64]| v.iter().map(|x| 2.0 * x).collect());
/// let mut y = vec![0.0; 2];
/// double.matvec(&vec![1.0, 3.0], &mut y);
/// assert_eq!(y, vec![2.0, 6.0]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FnOp<F>(pub F);

impl<F> FnOp<F> {
    /// Wrap `f`; the bound lets closure argument and return types be inferred.
    pub fn new<T>(f: F) -> Self
    where
        F: Fn(&[T]) -> Vec<T>,
    {
        FnOp(f)
    }
}

impl<T: Copy, F> MatVec<Vec<T>> for FnOp<F>
where
    F: Fn(&[T]) -> Vec<T>,
{
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        let out = (self.0)(x);
        assert_eq!(out.len(), y.len(), "Operator output has incorrect length");
        y.copy_from_slice(&out);
    }
}

/// Implements the `Indexing` trait for `Vec<T>`, treating a vector as a column vector.
impl<T> Indexing for Vec<T> {
    fn nrows(&self) -> usize {
        self.len()
    }
}

/// Implements the `Indexing` trait for `faer::Mat`, returning the number of rows.
impl<T> Indexing for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_dot_matches_serial_sum_for_short_vectors() {
        let x: Vec<f64> = (0..100).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = (0..100).map(|i| 1.0 - i as f64).collect();
        let serial = x.iter().zip(&y).fold(0.0, |acc, (a, b)| acc + a * b);
        assert_eq!(().dot(&x, &y), serial);
    }

    #[test]
    fn chunked_dot_is_reproducible_for_long_vectors() {
        let n = 3 * DOT_CHUNK + 17;
        let x: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
        let y: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
        let first = ().dot(&x, &y);
        for _ in 0..4 {
            assert_eq!(().dot(&x, &y), first);
        }
        let expected: f64 = x
            .chunks(DOT_CHUNK)
            .zip(y.chunks(DOT_CHUNK))
            .map(|(a, b)| a.iter().zip(b).fold(0.0, |acc, (p, q)| acc + p * q))
            .fold(0.0, |acc, v| acc + v);
        assert_eq!(first, expected);
    }

    #[test]
    fn closure_operator_applies() {
        let shift = FnOp::new(|v: &[f64]| v.iter().map(|x| x + 1.0).collect());
        let mut y = vec![0.0; 3];
        shift.matvec(&vec![1.0, 2.0, 3.0], &mut y);
        assert_eq!(y, vec![2.0, 3.0, 4.0]);
    }
}
