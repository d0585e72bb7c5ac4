//! Per-generation observers.

/// Receives the full engine state once per generation, in registration order.
///
/// Any `FnMut(&S)` closure is an observer; stateful recorders such as
/// [`History`](crate::utils::history::History) implement the trait directly.
pub trait Observer<S> {
    fn observe(&mut self, state: &S);
}

impl<S, F> Observer<S> for F
where
    F: FnMut(&S),
{
    fn observe(&mut self, state: &S) {
        self(state)
    }
}
