//! Dense-operator construction on top of Faer.
//!
//! This module provides the `DenseMatrix` trait and its implementation for `faer::Mat<T>`,
//! enabling construction from raw column-major storage and of the diagonal and tridiagonal
//! SPD test operators used throughout the experiments.

use crate::core::traits::{Indexing, MatVec};
use faer::Mat;
use num_traits::Float;

/// Blanket impl so any Faer Mat<T> is a DenseMatrix.
pub trait DenseMatrix<T>: MatVec<Vec<T>> + Indexing + Sized {
    /// Construct from raw column-major storage.
    fn from_raw(nrows: usize, ncols: usize, data: Vec<T>) -> Self;
    /// Square diagonal matrix.
    fn from_diagonal(diag: &[T]) -> Self;
    /// Square tridiagonal matrix with constant bands.
    fn tridiagonal(n: usize, sub: T, diag: T, sup: T) -> Self;
}

impl<T: Float> DenseMatrix<T> for Mat<T> {
    fn from_raw(nrows: usize, ncols: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), nrows * ncols, "raw storage has incorrect length");
        Mat::from_fn(nrows, ncols, |i, j| data[j * nrows + i])
    }

    fn from_diagonal(diag: &[T]) -> Self {
        let n = diag.len();
        Mat::from_fn(n, n, |i, j| if i == j { diag[i] } else { T::zero() })
    }

    fn tridiagonal(n: usize, sub: T, diag: T, sup: T) -> Self {
        Mat::from_fn(n, n, |i, j| {
            if i == j {
                diag
            } else if i == j + 1 {
                sub
            } else if j == i + 1 {
                sup
            } else {
                T::zero()
            }
        })
    }
}
