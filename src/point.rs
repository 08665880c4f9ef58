//! State buffers and results shared by the minimizers.

use crate::lin::Lin;

/// A point together with the objective value and gradient evaluated there.
///
/// `fx` and `fxprime` always come from one evaluation at `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<V, S> {
    pub x: V,
    pub fx: S,
    pub fxprime: V,
}

impl<V: Lin<S = S> + Clone, S: Copy> Point<V, S> {
    /// Evaluates `f` at `x`.
    pub fn evaluate<Func>(x: V, f: &mut Func) -> Self
        where Func: FnMut(&V, &mut V) -> S {
        let mut fxprime = x.clone();
        let fx = f(&x, &mut fxprime);
        Point { x: x, fx: fx, fxprime: fxprime }
    }

    pub(crate) fn snapshot(&self, alpha: S, function_calls: Vec<V>) -> Record<V, S> {
        Record {
            x: self.x.clone(),
            fx: self.fx,
            fxprime: self.fxprime.clone(),
            alpha: alpha,
            function_calls: function_calls,
        }
    }

    pub(crate) fn into_minimum(self, iterations: usize, converged: bool) -> Minimum<V, S> {
        Minimum {
            x: self.x,
            fx: self.fx,
            fxprime: self.fxprime,
            iterations: iterations,
            converged: converged,
        }
    }
}

/// Result of a minimization.
///
/// A result is returned even when the method did not converge; check
/// `converged` (or `fx` and the norm of `fxprime`) to judge its quality.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum<V, S> {
    /// Best point found
    pub x: V,
    /// Objective value at `x`
    pub fx: S,
    /// Gradient at `x`
    pub fxprime: V,
    /// Number of iterations performed
    pub iterations: usize,
    /// Whether the gradient norm tolerance was reached
    pub converged: bool,
}

/// Snapshot of one iteration, recorded when a history is requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<V, S> {
    pub x: V,
    pub fx: S,
    pub fxprime: V,
    /// Step length taken (learning rate for fixed step methods)
    pub alpha: S,
    /// Points at which the objective was evaluated during the iteration;
    /// only collected by `LineSearchDescent`.
    pub function_calls: Vec<V>,
}
