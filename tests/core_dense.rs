//! Tests for the operator and inner-product building blocks: dense and CSR matrix-vector
//! products, closure operators, and the chunked dot product.
//!
//! These tests verify the MatVec and InnerProduct trait implementations against manual
//! computations, using random and fixed data.

use approx::assert_abs_diff_eq;
use faer::Mat;
use pipecg::core::FnOp;
use pipecg::core::traits::{InnerProduct, MatVec};
use pipecg::core::wrappers::DOT_CHUNK;
use pipecg::matrix::{CsrMatrix, DenseMatrix};
use rand::Rng;

/// Test matrix-vector multiplication for a small random dense matrix.
///
/// This test constructs a random 5x5 matrix and a random vector, computes the matrix-vector
/// product using the MatVec trait, and checks the result against a manual computation.
#[test]
fn matvec_random_small() {
    let n = 5;
    let mut rng = rand::thread_rng();
    let vals: Vec<f64> = (0..n * n).map(|_| rng.r#gen()).collect();
    // raw storage is column-major
    let a: Mat<f64> = DenseMatrix::from_raw(n, n, vals.clone());
    let x: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    let mut y = vec![0.0; n];
    a.matvec(&x, &mut y);

    // check y[i] == sum_j A[i,j]*x[j]
    for i in 0..n {
        let expected = (0..n).map(|j| vals[j * n + i] * x[j]).sum::<f64>();
        assert_abs_diff_eq!(y[i], expected, epsilon = 1e-12);
    }
}

/// Test dot product and Euclidean norm for small vectors.
#[test]
fn dot_and_norm() {
    let x = vec![1.0, 2.0, 3.0];
    let y = vec![4.0, -5.0, 6.0];
    let ip = ();
    let dot = ip.dot(&x, &y);
    assert_abs_diff_eq!(dot, 1.0 * 4.0 + 2.0 * (-5.0) + 3.0 * 6.0, epsilon = 1e-12);
    let norm_x = ip.norm(&x);
    let expected_norm = ((1.0f64).powi(2) + 2.0f64.powi(2) + 3.0f64.powi(2)).sqrt();
    assert_abs_diff_eq!(norm_x, expected_norm, epsilon = 1e-12);
}

/// Long vectors are reduced chunk by chunk; the result is the in-order sum of chunk sums.
#[test]
fn long_dot_sums_chunks_in_order() {
    let n = 3 * DOT_CHUNK + 17;
    let mut rng = rand::thread_rng();
    let x: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>() - 0.5).collect();
    let y: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>() - 0.5).collect();
    let expected = x
        .chunks(DOT_CHUNK)
        .zip(y.chunks(DOT_CHUNK))
        .map(|(xc, yc)| xc.iter().zip(yc).fold(0.0, |acc, (a, b)| acc + a * b))
        .fold(0.0, |acc, v| acc + v);
    let ip = ();
    assert_eq!(ip.dot(&x, &y), expected);
    assert_eq!(ip.dot(&x, &y), ip.dot(&x, &y));
}

/// A random sparse pattern gives the same product in CSR and dense form.
#[test]
fn csr_matvec_matches_dense() {
    let (nrows, ncols) = (7, 5);
    let mut rng = rand::thread_rng();
    let mut row_ptr = vec![0];
    let mut col_idx = Vec::new();
    let mut values = Vec::new();
    for _ in 0..nrows {
        for j in 0..ncols {
            if rng.gen_bool(0.4) {
                col_idx.push(j);
                values.push(rng.r#gen::<f64>());
            }
        }
        row_ptr.push(col_idx.len());
    }
    let csr = CsrMatrix::from_csr(nrows, ncols, row_ptr, col_idx, values);
    let dense = csr.to_dense();
    let x: Vec<f64> = (0..ncols).map(|_| rng.r#gen()).collect();
    let mut y_csr = vec![0.0; nrows];
    let mut y_dense = vec![0.0; nrows];
    csr.matvec(&x, &mut y_csr);
    dense.matvec(&x, &mut y_dense);
    for i in 0..nrows {
        assert_abs_diff_eq!(y_csr[i], y_dense[i], epsilon = 1e-12);
    }
}

#[test]
fn closure_operator_applies_callable() {
    let shift = FnOp::new(|v: &[f64]| v.iter().enumerate().map(|(i, x)| x + i as f64).collect());
    let mut y = vec![0.0; 3];
    shift.matvec(&vec![1.0, 1.0, 1.0], &mut y);
    assert_eq!(y, vec![1.0, 2.0, 3.0]);
}
