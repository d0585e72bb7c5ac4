//! Matrix module: dense and sparse operators.

pub mod dense;
pub use dense::DenseMatrix;
pub mod sparse;
pub use sparse::CsrMatrix;
