// Compressed sparse row operator

use crate::core::traits::{Indexing, MatVec};
use faer::Mat;
use faer::sparse::{SparseRowMat, SymbolicSparseRowMat};
use num_traits::Float;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A read-only CSR matrix supporting y = A * x.
///
/// Each output entry is a serial sum over its row, in column-index order, so the serial and
/// row-parallel products are identical.
#[derive(Clone, Debug)]
pub struct CsrMatrix<T> {
    inner: SparseRowMat<usize, T>,
}

impl<T: Float> CsrMatrix<T> {
    /// Build a CSR from raw row-ptr, col-idx, and values.
    ///
    /// # Panics
    /// If the pattern is malformed: `row_ptr` not of length `nrows + 1` or decreasing, a column
    /// index out of range, column indices within a row not strictly increasing, or
    /// `values.len() != col_idx.len()`.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        let symbolic = SymbolicSparseRowMat::new_checked(nrows, ncols, row_ptr, None, col_idx);
        let inner = SparseRowMat::new(symbolic, values);
        Self { inner }
    }

    /// Diagonal entries (zero where not stored); feeds `Jacobi::from_diagonal`.
    pub fn diagonal(&self) -> Vec<T> {
        let n = self.inner.nrows().min(self.inner.ncols());
        (0..n).map(|i| self.get(i, i)).collect()
    }

    pub fn get(&self, i: usize, j: usize) -> T {
        let (cols, vals) = self.row(i);
        cols.binary_search(&j).map_or(T::zero(), |k| vals[k])
    }

    fn row(&self, i: usize) -> (&[usize], &[T]) {
        let symbolic = self.inner.symbolic();
        let row_ptr = symbolic.row_ptr();
        let range = row_ptr[i]..row_ptr[i + 1];
        (&symbolic.col_idx()[range.clone()], &self.inner.val()[range])
    }

    fn row_dot(&self, i: usize, x: &[T]) -> T {
        let (cols, vals) = self.row(i);
        cols.iter()
            .zip(vals)
            .fold(T::zero(), |acc, (&j, &v)| acc + v * x[j])
    }

    /// Compute y = A * x.  `x.len() == ncols`, `y.len() == nrows`.
    pub fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.inner.ncols());
        assert_eq!(y.len(), self.inner.nrows());
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row_dot(i, x);
        }
    }

    pub fn to_dense(&self) -> Mat<T> {
        Mat::from_fn(self.inner.nrows(), self.inner.ncols(), |i, j| self.get(i, j))
    }
}

#[cfg(feature = "rayon")]
impl<T: Float + Send + Sync> CsrMatrix<T> {
    /// Parallel SpMV using Rayon
    pub fn spmv_parallel(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.inner.ncols());
        assert_eq!(y.len(), self.inner.nrows());
        y.par_iter_mut()
            .enumerate()
            .for_each(|(i, yi)| *yi = self.row_dot(i, x));
    }
}

impl<T: Float + Send + Sync> MatVec<Vec<T>> for CsrMatrix<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        #[cfg(feature = "rayon")]
        self.spmv_parallel(x, y);
        #[cfg(not(feature = "rayon"))]
        self.spmv(x, y);
    }
}

impl<T> Indexing for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }
}
