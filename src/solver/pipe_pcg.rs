//! Pipelined predict and predict-and-recompute Conjugate Gradient (preconditioned).
//!
//! Same state machine as [`pipe_cg`](crate::solver::pipe_cg) with every vector of the residual
//! family doubled by a preconditioned shadow: `rt = M r`, `st = M s`, `wt = M w`, `ut = M u`.
//! The search direction is built from the shadow residual, `p_k = rt_k + β_k p_{k-1}`, and the
//! operator is applied to shadows (`u_k = A st_k`, `w_k = A rt_k` when recomputing).
//!
//! ```text
//! rt_k = rt_{k-1} - α_{k-1} st_{k-1}
//! wt_k = wt_{k-1} - α_{k-1} ut_{k-1}
//! st_k = wt_k + β_k st_{k-1}
//! u_k = A st_k,   ut_k = M u_k
//! w_k = A rt_k,   wt_k = M w_k                           (recompute only)
//! μ_k = p_k·s_k,  δ_k = r_k·st_k,  γ_k = st_k·s_k,  ν_k = rt_k·r_k
//! ```
//!
//! `δ_k` uses the mixed product `r_k·st_k`. `rt_k·s_k` and `p_k·s_k` agree with it only in
//! exact arithmetic and are not used.

use log::{debug, trace};
use num_traits::Float;

use crate::config::PipeOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::PipeError;
use crate::preconditioner::Preconditioner;
use crate::solver::observer::Observer;
use crate::solver::state::{PcgGeneration, PipePcgState, PipeState};
use crate::solver::variant::Variant;
use crate::solver::{
    LinearSolver, PipeStats, as_f64, check_inputs, check_mu, check_nu_prev, predict_nu,
    warn_nonfinite,
};
use crate::utils::vecops::{add_scaled, apply, precondition, residual, sub_scaled};

pub struct PipePcgSolver<'a, T> {
    pub opts: PipeOptions,
    observers: Vec<Box<dyn Observer<PipePcgState<T>> + 'a>>,
}

impl<'a, T: Float + Send + Sync> PipePcgSolver<'a, T> {
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
        O: Observer<PipePcgState<T>> + 'a,
    {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer<PipePcgState<T>> + 'a>) {
        self.observers.push(observer);
    }

    /// `pipe_{tag}_pcg`, e.g. `pipe_p_m_pcg`.
    pub fn name(&self) -> String {
        format!("pipe_{}_pcg", self.opts.variant.tag())
    }

    /// Run `max_iter` generations from the initial guess in `x`; `pc = None` is the identity.
    pub fn run<M>(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, Vec<T>>>,
        b: &Vec<T>,
        x: &mut Vec<T>,
    ) -> Result<PipeStats, PipeError>
    where
        M: MatVec<Vec<T>>,
    {
        let opts = self.opts;
        let name = self.name();
        if opts.check_dimensions {
            check_inputs(b, x, opts.max_iter)?;
        }
        debug!(
            "{name}: starting, n = {}, max_iter = {}, preconditioned = {}",
            b.len(),
            opts.max_iter,
            pc.is_some()
        );

        let init = initial_generation(a, pc, b, x)?;
        if opts.check_pivots {
            check_mu(0, init.mu)?;
        }
        let mut state: PipePcgState<T> = PipeState::initial(init);
        let mut warned = false;
        warn_nonfinite(&mut warned, &name, 0, state.current.alpha);
        self.notify(&state);

        for k in 1..opts.max_iter {
            let (next, nu_predicted) =
                step(a, pc, &state.current, opts.variant, opts.check_pivots.then_some(k))?;
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

    fn notify(&mut self, state: &PipePcgState<T>) {
        for observer in self.observers.iter_mut() {
            observer.observe(state);
        }
    }
}

fn initial_generation<M, T>(
    a: &M,
    pc: Option<&dyn Preconditioner<M, Vec<T>>>,
    b: &Vec<T>,
    x0: &Vec<T>,
) -> Result<PcgGeneration<T>, PipeError>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    let ip = ();
    let x = x0.clone();
    let r = residual(a, b, &x);
    let rt = precondition(pc, &r)?;
    let p = rt.clone();
    let nu = ip.dot(&rt, &r);
    let s = apply(a, &p);
    let st = precondition(pc, &s)?;
    let w = s.clone();
    let wt = st.clone();
    let u = apply(a, &st);
    let ut = precondition(pc, &u)?;
    let mu = ip.dot(&p, &s);
    let alpha = nu / mu;
    let delta = ip.dot(&r, &st);
    let gamma = ip.dot(&st, &s);
    Ok(PcgGeneration {
        x,
        r,
        rt,
        p,
        s,
        st,
        w,
        wt,
        u,
        ut,
        nu,
        mu,
        delta,
        gamma,
        alpha,
        beta: T::zero(),
    })
}

/// Build generation `k` from `prev`; also returns the predicted `ν_k` that formed `β_k`.
fn step<M, T>(
    a: &M,
    pc: Option<&dyn Preconditioner<M, Vec<T>>>,
    prev: &PcgGeneration<T>,
    variant: Variant,
    check: Option<usize>,
) -> Result<(PcgGeneration<T>, T), PipeError>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    let ip = ();
    let alpha1 = prev.alpha;

    let x = add_scaled(&prev.x, alpha1, &prev.p);
    let r = sub_scaled(&prev.r, alpha1, &prev.s);
    let rt = sub_scaled(&prev.rt, alpha1, &prev.st);
    let w_predicted = sub_scaled(&prev.w, alpha1, &prev.u);
    let wt_predicted = sub_scaled(&prev.wt, alpha1, &prev.ut);
    let nu_predicted = predict_nu(prev.nu, alpha1, prev.delta, prev.gamma, variant);
    if let Some(k) = check {
        check_nu_prev(k, prev.nu)?;
    }
    let beta = nu_predicted / prev.nu;
    let p = add_scaled(&rt, beta, &prev.p);
    let s = add_scaled(&w_predicted, beta, &prev.s);
    let st = add_scaled(&wt_predicted, beta, &prev.st);
    let u = apply(a, &st);
    let ut = precondition(pc, &u)?;
    let (w, wt) = if variant.recomputes() {
        let w = apply(a, &rt);
        let wt = precondition(pc, &w)?;
        (w, wt)
    } else {
        (w_predicted, wt_predicted)
    };

    let mu = ip.dot(&p, &s);
    let delta = ip.dot(&r, &st);
    let gamma = ip.dot(&st, &s);
    let nu = ip.dot(&rt, &r);
    if let Some(k) = check {
        check_mu(k, mu)?;
    }
    let alpha = nu / mu;

    Ok((
        PcgGeneration {
            x,
            r,
            rt,
            p,
            s,
            st,
            w,
            wt,
            u,
            ut,
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

impl<'a, M, T> LinearSolver<M, Vec<T>> for PipePcgSolver<'a, T>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    type Error = PipeError;

    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, Vec<T>>>,
        b: &Vec<T>,
        x: &mut Vec<T>,
    ) -> Result<PipeStats, PipeError> {
        self.run(a, pc, b, x)
    }
}
