//! Per-generation state handed to observers.
//!
//! Each engine step builds a brand-new generation from the previous one. The state keeps
//! exactly two generations alive: `current` and, from generation 1 on, `previous`.

use num_traits::Float;

/// Read access shared by both engines' generations.
pub trait Generation<T> {
    fn x(&self) -> &[T];
    fn r(&self) -> &[T];
    fn w(&self) -> &[T];
    /// `ν_k` in its recomputed form (`r·r`, or `r̃·r` when preconditioned).
    fn nu(&self) -> T;
    fn alpha(&self) -> T;
    fn beta(&self) -> T;
}

/// One generation of the unpreconditioned recurrence.
#[derive(Clone, Debug)]
pub struct CgGeneration<T> {
    pub x: Vec<T>,
    pub r: Vec<T>,
    pub p: Vec<T>,
    pub s: Vec<T>,
    pub w: Vec<T>,
    pub u: Vec<T>,
    pub nu: T,
    pub mu: T,
    pub delta: T,
    pub gamma: T,
    pub alpha: T,
    pub beta: T,
}

/// One generation of the preconditioned recurrence: the unpreconditioned vectors plus
/// their preconditioner-transformed shadows `rt`, `wt`, `st`, `ut`.
#[derive(Clone, Debug)]
pub struct PcgGeneration<T> {
    pub x: Vec<T>,
    pub r: Vec<T>,
    pub rt: Vec<T>,
    pub p: Vec<T>,
    pub s: Vec<T>,
    pub st: Vec<T>,
    pub w: Vec<T>,
    pub wt: Vec<T>,
    pub u: Vec<T>,
    pub ut: Vec<T>,
    pub nu: T,
    pub mu: T,
    pub delta: T,
    pub gamma: T,
    pub alpha: T,
    pub beta: T,
}

macro_rules! impl_generation {
    ($ty:ident) => {
        impl<T: Copy> Generation<T> for $ty<T> {
            fn x(&self) -> &[T] {
                &self.x
            }
            fn r(&self) -> &[T] {
                &self.r
            }
            fn w(&self) -> &[T] {
                &self.w
            }
            fn nu(&self) -> T {
                self.nu
            }
            fn alpha(&self) -> T {
                self.alpha
            }
            fn beta(&self) -> T {
                self.beta
            }
        }
    };
}

impl_generation!(CgGeneration);
impl_generation!(PcgGeneration);

/// Full engine state at generation `k`.
#[derive(Clone, Debug)]
pub struct PipeState<G, T> {
    pub k: usize,
    pub current: G,
    /// Generation `k-1`; `None` at generation 0.
    pub previous: Option<G>,
    /// The recurrence prediction of `ν_k` that formed `β_k`.
    /// Equal to `current.nu` at generation 0.
    pub nu_predicted: T,
    /// `α_{k-2}`. Carried forward every step but never read by the recurrence.
    pub alpha_prev2: T,
}

pub type PipeCgState<T> = PipeState<CgGeneration<T>, T>;
pub type PipePcgState<T> = PipeState<PcgGeneration<T>, T>;

impl<G: Generation<T>, T: Float> PipeState<G, T> {
    pub(crate) fn initial(current: G) -> Self {
        let nu = current.nu();
        Self {
            k: 0,
            current,
            previous: None,
            nu_predicted: nu,
            alpha_prev2: T::zero(),
        }
    }

    /// Install generation `k+1`; the old `previous` is dropped here.
    pub(crate) fn advance(&mut self, next: G, nu_predicted: T) {
        self.alpha_prev2 = self.alpha_prev();
        let old = std::mem::replace(&mut self.current, next);
        self.previous = Some(old);
        self.nu_predicted = nu_predicted;
        self.k += 1;
    }

    /// `α_{k-1}` (zero at generation 0).
    pub fn alpha_prev(&self) -> T {
        self.previous.as_ref().map_or(T::zero(), |g| g.alpha())
    }

    /// `β_{k-1}` (zero at generation 0).
    pub fn beta_prev(&self) -> T {
        self.previous.as_ref().map_or(T::zero(), |g| g.beta())
    }
}
