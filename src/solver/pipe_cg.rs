//! Pipelined predict and predict-and-recompute Conjugate Gradient (unpreconditioned).
//!
//! Every generation carries `x, r, p, s = A p, w ≈ A r, u ≈ A s` and the scalars
//! `ν = r·r, μ = p·s, δ = r·s, γ = s·s, α = ν/μ, β`.
//! One step reads generation `k-1` only:
//!
//! ```text
//! x_k = x_{k-1} + α_{k-1} p_{k-1}
//! r_k = r_{k-1} - α_{k-1} s_{k-1}
//! w_k = w_{k-1} - α_{k-1} u_{k-1}
//! ν'_k = -ν_{k-1} + α²_{k-1} γ_{k-1}                     (Meurant)
//!      =  ν_{k-1} - 2 α_{k-1} δ_{k-1} + α²_{k-1} γ_{k-1}  (standard)
//! β_k = ν'_k / ν_{k-1}
//! p_k = r_k + β_k p_{k-1}
//! s_k = w_k + β_k s_{k-1}
//! u_k = A s_k
//! w_k = A r_k                                            (recompute only)
//! μ_k = p_k·s_k,  δ_k = r_k·s_k,  γ_k = s_k·s_k,  ν_k = r_k·r_k
//! α_k = ν_k / μ_k
//! ```
//!
//! The predicted `ν'_k` only forms `β_k`; the recomputed `ν_k` forms `α_k` and seeds the next
//! step. In the predict variants `w` never sees the operator after generation 0 and drifts
//! away from `A r`; in the recompute variants it is refreshed after `s_k` has been formed
//! from the predicted value.
//!
//! # References
//! - Chen, T., Carson, E. (2020). Predict-and-recompute conjugate gradient variants.
//!   SIAM J. Sci. Comput.
//! - Meurant, G. (1987). Multitasking the conjugate gradient method on the CRAY X-MP/48.
//!   Parallel Computing.

use log::{debug, trace};
use num_traits::Float;

use crate::config::PipeOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::PipeError;
use crate::preconditioner::Preconditioner;
use crate::solver::observer::Observer;
use crate::solver::state::{CgGeneration, PipeCgState, PipeState};
use crate::solver::variant::Variant;
use crate::solver::{
    LinearSolver, PipeStats, as_f64, check_inputs, check_mu, check_nu_prev, predict_nu,
    warn_nonfinite,
};
use crate::utils::vecops::{add_scaled, apply, residual, sub_scaled};

pub struct PipeCgSolver<'a, T> {
    pub opts: PipeOptions,
    observers: Vec<Box<dyn Observer<PipeCgState<T>> + 'a>>,
}

impl<'a, T: Float + Send + Sync> PipeCgSolver<'a, T> {
    pub fn new(variant: Variant, max_iter: usize) -> Self {
        Self::from_options(PipeOptions::new(variant, max_iter))
    }

    pub fn from_options(opts: PipeOptions) -> Self {
        Self { opts, observers: Vec::new() }
    }

    pub fn with_checks(mut self, flag: bool) -> Self {
        self.opts = self.opts.with_checks(flag);
        self
    }

    /// Register an observer; observers run in registration order.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: Observer<PipeCgState<T>> + 'a,
    {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer<PipeCgState<T>> + 'a>) {
        self.observers.push(observer);
    }

    /// `pipe_{tag}_cg`, e.g. `pipe_pr_m_cg`.
    pub fn name(&self) -> String {
        format!("pipe_{}_cg", self.opts.variant.tag())
    }

    /// Run `max_iter` generations from the initial guess in `x`; the last iterate is written back.
    pub fn run<M>(&mut self, a: &M, b: &Vec<T>, x: &mut Vec<T>) -> Result<PipeStats, PipeError>
    where
        M: MatVec<Vec<T>> + ?Sized,
    {
        let opts = self.opts;
        let name = self.name();
        if opts.check_dimensions {
            check_inputs(b, x, opts.max_iter)?;
        }
        debug!("{name}: starting, n = {}, max_iter = {}", b.len(), opts.max_iter);

        let init = initial_generation(a, b, x);
        if opts.check_pivots {
            check_mu(0, init.mu)?;
        }
        let mut state: PipeCgState<T> = PipeState::initial(init);
        let mut warned = false;
        warn_nonfinite(&mut warned, &name, 0, state.current.alpha);
        self.notify(&state);

        for k in 1..opts.max_iter {
            let check = opts.check_pivots.then_some(k);
            let (next, nu_predicted) = step(a, &state.current, opts.variant, check)?;
            state.advance(next, nu_predicted);
            trace!(
                "{name}: k = {k}, nu = {:e}, alpha = {:e}, beta = {:e}",
                as_f64(state.current.nu),
                as_f64(state.current.alpha),
                as_f64(state.current.beta)
            );
            warn_nonfinite(&mut warned, &name, k, state.current.alpha);
            self.notify(&state);
        }

        debug!("{name}: finished, final nu = {:e}", as_f64(state.current.nu));
        *x = state.current.x;
        Ok(PipeStats { name, max_iter: opts.max_iter })
    }

    fn notify(&mut self, state: &PipeCgState<T>) {
        for observer in self.observers.iter_mut() {
            observer.observe(state);
        }
    }
}

fn initial_generation<M, T>(a: &M, b: &Vec<T>, x0: &Vec<T>) -> CgGeneration<T>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
{
    let ip = ();
    let x = x0.clone();
    let r = residual(a, b, &x);
    let p = r.clone();
    let nu = ip.dot(&r, &r);
    let s = apply(a, &p);
    let w = s.clone();
    let u = apply(a, &w);
    let mu = ip.dot(&p, &s);
    let alpha = nu / mu;
    let delta = ip.dot(&r, &s);
    let gamma = ip.dot(&s, &s);
    CgGeneration {
        x,
        r,
        p,
        s,
        w,
        u,
        nu,
        mu,
        delta,
        gamma,
        alpha,
        beta: T::zero(),
    }
}

/// Build generation `k` from `prev`; also returns the predicted `ν_k` that formed `β_k`.
/// `check` carries `k` when pivot checks are on.
fn step<M, T>(
    a: &M,
    prev: &CgGeneration<T>,
    variant: Variant,
    check: Option<usize>,
) -> Result<(CgGeneration<T>, T), PipeError>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
{
    let ip = ();
    let alpha1 = prev.alpha;

    let x = add_scaled(&prev.x, alpha1, &prev.p);
    let r = sub_scaled(&prev.r, alpha1, &prev.s);
    let w_predicted = sub_scaled(&prev.w, alpha1, &prev.u);
    let nu_predicted = predict_nu(prev.nu, alpha1, prev.delta, prev.gamma, variant);
    if let Some(k) = check {
        check_nu_prev(k, prev.nu)?;
    }
    let beta = nu_predicted / prev.nu;
    let p = add_scaled(&r, beta, &prev.p);
    let s = add_scaled(&w_predicted, beta, &prev.s);
    let u = apply(a, &s);
    let w = if variant.recomputes() { apply(a, &r) } else { w_predicted };

    let mu = ip.dot(&p, &s);
    let delta = ip.dot(&r, &s);
    let gamma = ip.dot(&s, &s);
    let nu = ip.dot(&r, &r);
    if let Some(k) = check {
        check_mu(k, mu)?;
    }
    let alpha = nu / mu;

    Ok((
        CgGeneration {
            x,
            r,
            p,
            s,
            w,
            u,
            nu,
            mu,
            delta,
            gamma,
            alpha,
            beta,
        },
        nu_predicted,
    ))
}

impl<'a, M, T> LinearSolver<M, Vec<T>> for PipeCgSolver<'a, T>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    type Error = PipeError;

    fn solve(
        &mut self,
        a: &M,
        _pc: Option<&dyn Preconditioner<M, Vec<T>>>,
        b: &Vec<T>,
        x: &mut Vec<T>,
    ) -> Result<PipeStats, PipeError> {
        self.run(a, b, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::Mat;

    fn small_spd() -> (Mat<f64>, Vec<f64>) {
        // SPD system: [[4,1],[1,3]] x = [1,2]
        let a = Mat::from_fn(2, 2, |i, j| [[4.0, 1.0], [1.0, 3.0]][i][j]);
        (a, vec![1.0, 2.0])
    }

    #[test]
    fn every_variant_solves_simple_spd() {
        let (a, b) = small_spd();
        let expected = [0.09090909090909091, 0.6363636363636364];
        for variant in Variant::all_variants() {
            let mut x = vec![0.0, 0.0];
            let mut solver = PipeCgSolver::new(variant, 3);
            let stats = solver.run(&a, &b, &mut x).unwrap();
            assert_eq!(stats.max_iter, 3);
            for (xi, ei) in x.iter().zip(expected.iter()) {
                assert!((xi - ei).abs() < 1e-10, "{}: xi = {}, expected = {}", stats.name, xi, ei);
            }
        }
    }

    #[test]
    fn result_record_names_the_variant() {
        let (a, b) = small_spd();
        let mut x = vec![0.0; 2];
        let stats = PipeCgSolver::new(Variant::RECOMPUTE_MEURANT, 2).run(&a, &b, &mut x).unwrap();
        assert_eq!(stats, PipeStats { name: "pipe_pr_m_cg".into(), max_iter: 2 });
    }

    #[test]
    fn generation_zero_matches_initialization() {
        let (a, b) = small_spd();
        let mut seen = Vec::new();
        {
            let mut solver = PipeCgSolver::new(Variant::predict(), 1)
                .with_observer(|s: &PipeCgState<f64>| seen.push(s.clone()));
            solver.run(&a, &b, &mut vec![0.0; 2]).unwrap();
        }
        assert_eq!(seen.len(), 1);
        let g0 = &seen[0];
        assert_eq!(g0.k, 0);
        assert!(g0.previous.is_none());
        assert_eq!(g0.current.r, b);
        assert_eq!(g0.current.w, g0.current.s);
        assert_eq!(g0.current.nu, 5.0);
        // s0 = A r0 = [6, 7], mu0 = 1*6 + 2*7
        assert_eq!(g0.current.s, vec![6.0, 7.0]);
        assert_eq!(g0.current.mu, 20.0);
        assert_eq!(g0.current.alpha, 0.25);
        assert_eq!(g0.alpha_prev(), 0.0);
        assert_eq!(g0.beta_prev(), 0.0);
        assert_eq!(g0.nu_predicted, g0.current.nu);
    }

    #[test]
    fn previous_generation_and_inert_alpha_are_carried() {
        let (a, b) = small_spd();
        let mut alphas = Vec::new();
        let mut carried = Vec::new();
        {
            let mut solver =
                PipeCgSolver::new(Variant::RECOMPUTE, 3).with_observer(|s: &PipeCgState<f64>| {
                    alphas.push(s.current.alpha);
                    carried.push((s.alpha_prev(), s.alpha_prev2));
                });
            solver.run(&a, &b, &mut vec![0.0; 2]).unwrap();
        }
        assert_eq!(carried[0], (0.0, 0.0));
        assert_eq!(carried[1], (alphas[0], 0.0));
        assert_eq!(carried[2], (alphas[1], alphas[0]));
    }

    #[test]
    fn zero_rhs_propagates_nan_by_default() {
        let (a, _) = small_spd();
        let b = vec![0.0, 0.0];
        let mut x = vec![0.0, 0.0];
        let stats = PipeCgSolver::new(Variant::predict(), 2).run(&a, &b, &mut x).unwrap();
        assert_eq!(stats.name, "pipe_p_cg");
        assert!(x.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn pivot_check_reports_vanished_mu() {
        let (a, _) = small_spd();
        let b = vec![0.0, 0.0];
        let mut x = vec![0.0, 0.0];
        let err = PipeCgSolver::new(Variant::predict(), 2)
            .with_checks(true)
            .run(&a, &b, &mut x)
            .unwrap_err();
        assert_eq!(err, PipeError::singular(0, "mu"));
    }

    #[test]
    fn dimension_check_is_opt_in() {
        let (a, b) = small_spd();
        let mut x = vec![0.0; 3];
        let err = PipeCgSolver::new(Variant::RECOMPUTE, 2)
            .with_checks(true)
            .run(&a, &b, &mut x)
            .unwrap_err();
        assert_eq!(err, PipeError::dimension_mismatch("initial guess", 2, 3));
        let err = PipeCgSolver::new(Variant::RECOMPUTE, 0)
            .with_checks(true)
            .run(&a, &b, &mut vec![0.0; 2])
            .unwrap_err();
        assert_eq!(err, PipeError::InvalidIterationBudget);
    }

    #[test]
    fn linear_solver_trait_ignores_preconditioner() {
        let (a, b) = small_spd();
        let mut x1 = vec![0.0; 2];
        let mut x2 = vec![0.0; 2];
        let pc = crate::preconditioner::Jacobi::from_diagonal(&[4.0, 3.0]);
        PipeCgSolver::new(Variant::RECOMPUTE, 3).run(&a, &b, &mut x1).unwrap();
        PipeCgSolver::new(Variant::RECOMPUTE, 3).solve(&a, Some(&pc), &b, &mut x2).unwrap();
        assert_eq!(x1, x2);
    }
}
