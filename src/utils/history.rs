//! Recording observer for convergence experiments.
//!
//! `History` keeps one [`IterRecord`] per generation: the scalars driving the recurrence,
//! the norm of the recurrence residual `r_k`, the norm of the true residual `b - A x_k`
//! and the gap between the two. In the predict variants that gap is where the loss of
//! accuracy shows up. With the exact solution supplied it also records `‖x_k - x*‖_A`.
//!
//! Recording costs one extra operator application per generation (two with an exact
//! solution); the engine state is only read.
//!
//! # Example
//! ```rust
//! use faer::Mat;
//! use pipecg::solver::{PipeCgSolver, PipeCgState, Variant};
//! use pipecg::utils::history::History;
//!
//! let a = Mat::from_fn(2, 2, |i, j| if i == j { 2.0 } else { 0.5 });
//! let b = vec![1.0, 1.0];
//! let mut history = History::new(&a, &b);
//! {
//!     let mut solver = PipeCgSolver::new(Variant::RECOMPUTE, 3)
//!         .with_observer(|s: &PipeCgState<f64>| history.record(s));
//!     solver.run(&a, &b, &mut vec![0.0; 2]).unwrap();
//! }
//! assert_eq!(history.records().len(), 3);
//! ```

use num_traits::Float;

use crate::core::traits::{InnerProduct, MatVec};
use crate::solver::observer::Observer;
use crate::solver::state::{Generation, PipeState};
use crate::utils::vecops::{apply, residual};

/// Diagnostics for one generation.
#[derive(Clone, Debug, PartialEq)]
pub struct IterRecord<T> {
    pub k: usize,
    pub nu: T,
    pub alpha: T,
    pub beta: T,
    /// ‖r_k‖ for the recurrence residual.
    pub residual_norm: T,
    /// ‖b - A x_k‖.
    pub true_residual_norm: T,
    /// ‖(b - A x_k) - r_k‖.
    pub residual_gap: T,
    /// ‖x_k - x*‖_A, when the exact solution is known.
    pub error_a_norm: Option<T>,
}

pub struct History<'a, M: ?Sized, T> {
    a: &'a M,
    b: &'a [T],
    x_true: Option<&'a [T]>,
    records: Vec<IterRecord<T>>,
}

impl<'a, M, T> History<'a, M, T>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
{
    pub fn new(a: &'a M, b: &'a [T]) -> Self {
        Self { a, b, x_true: None, records: Vec::new() }
    }

    pub fn with_solution(mut self, x_true: &'a [T]) -> Self {
        self.x_true = Some(x_true);
        self
    }

    pub fn records(&self) -> &[IterRecord<T>] {
        &self.records
    }

    pub fn into_records(self) -> Vec<IterRecord<T>> {
        self.records
    }

    pub fn record<G: Generation<T>>(&mut self, state: &PipeState<G, T>) {
        let ip = ();
        let g = &state.current;
        let x = g.x().to_vec();
        let r = g.r().to_vec();
        let true_r = residual(self.a, self.b, &x);
        let gap: Vec<T> = true_r.iter().zip(&r).map(|(&t, &ri)| t - ri).collect();
        let error_a_norm = self.x_true.map(|xs| {
            let e: Vec<T> = x.iter().zip(xs).map(|(&xi, &si)| xi - si).collect();
            let ae = apply(self.a, &e);
            ip.dot(&e, &ae).sqrt()
        });
        self.records.push(IterRecord {
            k: state.k,
            nu: g.nu(),
            alpha: g.alpha(),
            beta: g.beta(),
            residual_norm: ip.norm(&r),
            true_residual_norm: ip.norm(&true_r),
            residual_gap: ip.norm(&gap),
            error_a_norm,
        });
    }
}

impl<'a, M, T, G> Observer<PipeState<G, T>> for History<'a, M, T>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
    G: Generation<T>,
{
    fn observe(&mut self, state: &PipeState<G, T>) {
        self.record(state);
    }
}
