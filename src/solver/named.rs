//! Named entry points, one per variant and engine.
//!
//! Each function fixes the variant and forwards to [`PipeCgSolver`] or [`PipePcgSolver`].
//! `observers` run once per generation in the order given.

use num_traits::Float;

use crate::core::traits::MatVec;
use crate::error::PipeError;
use crate::preconditioner::Preconditioner;
use crate::solver::observer::Observer;
use crate::solver::pipe_cg::PipeCgSolver;
use crate::solver::pipe_pcg::PipePcgSolver;
use crate::solver::state::{PipeCgState, PipePcgState};
use crate::solver::variant::Variant;
use crate::solver::PipeStats;

pub type CgObservers<'a, T> = Vec<Box<dyn Observer<PipeCgState<T>> + 'a>>;
pub type PcgObservers<'a, T> = Vec<Box<dyn Observer<PipePcgState<T>> + 'a>>;

fn run_cg<'a, M, T>(
    variant: Variant,
    a: &M,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: CgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
{
    let mut solver = PipeCgSolver::new(variant, max_iter);
    for observer in observers {
        solver.add_observer(observer);
    }
    solver.run(a, b, x)
}

fn run_pcg<'a, M, T>(
    variant: Variant,
    a: &M,
    pc: Option<&dyn Preconditioner<M, Vec<T>>>,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: PcgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    let mut solver = PipePcgSolver::new(variant, max_iter);
    for observer in observers {
        solver.add_observer(observer);
    }
    solver.run(a, pc, b, x)
}

/// Pipelined predict CG.
pub fn pipe_p_cg<'a, M, T>(
    a: &M,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: CgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
{
    run_cg(Variant::predict(), a, b, x, max_iter, observers)
}

/// Pipelined predict-and-recompute CG.
pub fn pipe_pr_cg<'a, M, T>(
    a: &M,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: CgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
{
    run_cg(Variant::RECOMPUTE, a, b, x, max_iter, observers)
}

/// Pipelined predict CG, Meurant update.
pub fn pipe_p_m_cg<'a, M, T>(
    a: &M,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: CgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
{
    run_cg(Variant::MEURANT, a, b, x, max_iter, observers)
}

/// Pipelined predict-and-recompute CG, Meurant update.
pub fn pipe_pr_m_cg<'a, M, T>(
    a: &M,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: CgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>> + ?Sized,
    T: Float + Send + Sync,
{
    run_cg(Variant::RECOMPUTE_MEURANT, a, b, x, max_iter, observers)
}

/// Pipelined predict PCG.
pub fn pipe_p_pcg<'a, M, T>(
    a: &M,
    pc: Option<&dyn Preconditioner<M, Vec<T>>>,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: PcgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    run_pcg(Variant::predict(), a, pc, b, x, max_iter, observers)
}

/// Pipelined predict-and-recompute PCG.
pub fn pipe_pr_pcg<'a, M, T>(
    a: &M,
    pc: Option<&dyn Preconditioner<M, Vec<T>>>,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: PcgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    run_pcg(Variant::RECOMPUTE, a, pc, b, x, max_iter, observers)
}

/// Pipelined predict PCG, Meurant update.
pub fn pipe_p_m_pcg<'a, M, T>(
    a: &M,
    pc: Option<&dyn Preconditioner<M, Vec<T>>>,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: PcgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    run_pcg(Variant::MEURANT, a, pc, b, x, max_iter, observers)
}

/// Pipelined predict-and-recompute PCG, Meurant update.
pub fn pipe_pr_m_pcg<'a, M, T>(
    a: &M,
    pc: Option<&dyn Preconditioner<M, Vec<T>>>,
    b: &Vec<T>,
    x: &mut Vec<T>,
    max_iter: usize,
    observers: PcgObservers<'a, T>,
) -> Result<PipeStats, PipeError>
where
    M: MatVec<Vec<T>>,
    T: Float + Send + Sync,
{
    run_pcg(Variant::RECOMPUTE_MEURANT, a, pc, b, x, max_iter, observers)
}
