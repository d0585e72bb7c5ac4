//! pipecg: pipelined predict and predict-and-recompute Conjugate Gradient kernels
//!
//! This crate provides the recurrence engines for the pipelined CG family on symmetric
//! positive-definite systems: predict and predict-and-recompute variants, each with the
//! standard or Meurant scalar update, unpreconditioned or preconditioned. An engine runs a
//! fixed number of generations and reports every generation to user observers.

pub mod config;
pub mod core;
pub mod error;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use crate::core::*;
pub use error::*;
pub use matrix::*;
pub use preconditioner::*;
pub use solver::*;
pub use utils::*;
