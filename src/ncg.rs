//! Implementation of a nonlinear conjugate gradient method.

use std::fmt::Debug;
use std::mem;

use log::{debug, trace};
use num_traits::Float;

use crate::lin::Lin;
use crate::point::{Minimum, Point, Record};
use crate::wolfe::WolfeLineSearch;

/// Nonlinear conjugate gradient method with the Polak--Ribière (PR+)
/// direction update and a strong Wolfe line search.
#[derive(Debug, Clone)]
pub struct NonlinearCG<S: Float> {
    /// Parameters for the line search
    pub line_search: WolfeLineSearch<S>,
    /// Initial step of the first line search; later searches start from the
    /// step found by the previous one, or again from `alpha0` after a failure.
    pub alpha0: S,
    /// Desired norm of the gradient
    pub grad_norm_tol: S,
    /// Maximum number of iterations to take; `None` means `20 * dim(x0)`
    pub max_iter: Option<usize>,
}

impl NonlinearCG<f32> {
    pub fn new() -> Self {
        NonlinearCG {
            line_search: WolfeLineSearch::<f32>::new(),
            alpha0: 1.,
            grad_norm_tol: 1e-5,
            max_iter: None,
        }
    }
}

impl NonlinearCG<f64> {
    pub fn new() -> Self {
        NonlinearCG {
            line_search: WolfeLineSearch::<f64>::new(),
            alpha0: 1.,
            grad_norm_tol: 1e-5,
            max_iter: None,
        }
    }
}

impl Default for NonlinearCG<f32> {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for NonlinearCG<f64> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Float + Debug> NonlinearCG<S> {
    /// Mininimize the given nonlinear function over a linear space.
    ///
    /// The function `f` must provide its value as well as its gradient,
    /// returned in the provided `&mut V` (to avoid allocation).
    /// `x0` is used as the initial guess.
    pub fn minimize<Func, V>(&self, x0: &V, f: Func) -> Minimum<V, S>
        where Func: FnMut(&V, &mut V) -> S,
              V: Lin<S = S> + Clone {
        self.run(x0, f, None)
    }

    /// The same as `minimize`, but appends a snapshot of the current point
    /// and the step taken to `history` after every line search, and one
    /// final snapshot of the result.
    pub fn minimize_with_history<Func, V>(&self,
                                          x0: &V,
                                          f: Func,
                                          history: &mut Vec<Record<V, S>>) -> Minimum<V, S>
        where Func: FnMut(&V, &mut V) -> S,
              V: Lin<S = S> + Clone {
        self.run(x0, f, Some(history))
    }

    fn run<Func, V>(&self,
                    x0: &V,
                    mut f: Func,
                    mut history: Option<&mut Vec<Record<V, S>>>) -> Minimum<V, S>
        where Func: FnMut(&V, &mut V) -> S,
              V: Lin<S = S> + Clone {
        let max_iter = self.max_iter.unwrap_or(20 * x0.dimension());

        // allocate storage
        let mut current = Point::evaluate(x0.clone(), &mut f);
        let mut next = current.clone();
        let mut yk = x0.origin();
        let mut pk = current.fxprime.clone();
        pk.scale(-S::one());

        let mut step = self.alpha0;
        let mut alpha = S::zero();
        let mut converged = current.fxprime.norm() <= self.grad_norm_tol;
        let mut iterations = 0;

        while !converged && iterations < max_iter {
            alpha = self.line_search.search(&mut f, &pk, &current, &mut next, step, None);
            iterations += 1;

            if let Some(h) = history.as_mut() {
                h.push(current.snapshot(alpha, Vec::new()));
            }

            if alpha == S::zero() {
                // a zero warm start would only ever probe `current` again
                debug!("nonlinear CG: line search failed in iteration {}, restarting", iterations);
                step = self.alpha0;
                pk.clone_from(&current.fxprime);
                pk.scale(-S::one());
            } else {
                step = alpha;
                // g_{k+1} - g_k
                yk.clone_from(&next.fxprime);
                yk.ray_to(&current.fxprime, -S::one());

                let delta_k = current.fxprime.dot(&current.fxprime);
                let beta_k = (yk.dot(&next.fxprime) / delta_k).max(S::zero());

                pk.combine(beta_k, &next.fxprime, -S::one());
                mem::swap(&mut current, &mut next);
            }

            trace!("nonlinear CG: iteration {}, fx = {:?}, alpha = {:?}",
                   iterations, current.fx, alpha);
            converged = current.fxprime.norm() <= self.grad_norm_tol;
        }

        if let Some(h) = history.as_mut() {
            h.push(current.snapshot(alpha, Vec::new()));
        }

        debug!("nonlinear CG: {} after {} iterations, fx = {:?}",
               if converged { "converged" } else { "stopped" }, iterations, current.fx);
        current.into_minimum(iterations, converged)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lin::Rn;

    fn quad2d(x: &Rn<f64>, grad: &mut Rn<f64>) -> f64 {
        grad[0] = 2. * x[0];
        grad[1] = 20. * x[1];

        x[0].powi(2) + 10. * x[1].powi(2)
    }

    #[test]
    fn quadratic_2d() {
        let m = NonlinearCG::<f64>::new();
        let r = m.minimize(&Rn::new(vec![1., 1.]), quad2d);

        assert!(r.converged);
        assert!(r.fx < 1e-10);
        assert!(r.fxprime.norm() <= m.grad_norm_tol);
        assert!(r.iterations <= 40);
    }

    #[test]
    fn scalar_space() {
        let m = NonlinearCG::<f64>::new();
        let mut ev: Vec<f64> = vec![];

        let r = {
            let f = |x: &f64, grad: &mut f64| { ev.push(*x); *grad = 2. * (x - 1.); (x - 1.) * (x - 1.) };
            m.minimize(&5., f)
        };

        assert!(r.converged);
        assert_eq!(r.x, 1.);
        // initial evaluation, the overshooting first trial and the bisection
        assert_eq!(ev, vec![5., -3., 1.]);
    }

    #[test]
    fn already_converged() {
        let m = NonlinearCG::<f64>::new();
        let mut calls = 0;
        let mut history = vec![];

        let x0 = Rn::new(vec![0., 0.]);
        let r = m.minimize_with_history(&x0, |x, g| { calls += 1; quad2d(x, g) }, &mut history);

        assert!(r.converged);
        assert_eq!(r.iterations, 0);
        assert_eq!(r.x, x0);
        assert_eq!(calls, 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn history_snapshots() {
        let m = NonlinearCG::<f64>::new();
        let mut history = vec![];

        let r = m.minimize_with_history(&Rn::new(vec![1., 1.]), quad2d, &mut history);

        // one snapshot per iteration plus the final one
        assert_eq!(history.len(), r.iterations + 1);
        assert_eq!(history[0].x, Rn::new(vec![1., 1.]));
        assert_eq!(history[0].fx, 11.);
        let last = history.last().unwrap();
        assert_eq!(last.x, r.x);
        assert_eq!(last.fxprime, r.fxprime);
        assert!(history.iter().all(|h| h.function_calls.is_empty()));
    }

    #[test]
    fn iteration_budget() {
        let mut m = NonlinearCG::<f64>::new();
        m.max_iter = Some(1);
        let r = m.minimize(&Rn::new(vec![1., 1.]), quad2d);

        assert!(!r.converged);
        assert_eq!(r.iterations, 1);
        assert!(r.fx < 11.);
        // the result is still a consistent point
        let mut g = r.x.clone();
        assert_eq!(quad2d(&r.x, &mut g), r.fx);
        assert_eq!(g, r.fxprime);
    }

    #[test]
    fn failed_searches_restart() {
        let mut m = NonlinearCG::<f64>::new();
        m.max_iter = Some(3);
        let mut calls = 0;
        let mut history = vec![];

        // gradient has wrong sign, so every direction goes uphill
        let f = |x: &Rn<f64>, g: &mut Rn<f64>| { calls += 1; g[0] = -2. * x[0]; x[0] * x[0] };
        let r = m.minimize_with_history(&Rn::new(vec![1.]), f, &mut history);

        assert!(!r.converged);
        assert_eq!(r.iterations, 3);
        assert_eq!(r.x, Rn::new(vec![1.]));
        assert_eq!(r.fx, 1.);
        assert_eq!(history.len(), 4);
        assert!(history.iter().all(|h| h.alpha == 0.));
        // each search starts again from alpha0: one overshooting trial and
        // the whole zoom budget, instead of probing the current point
        assert_eq!(calls, 1 + 3 * (1 + m.line_search.max_zoom_iter));
    }
}
