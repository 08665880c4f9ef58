//! Steepest descent, with a fixed learning rate or with a line search.

use std::fmt::Debug;
use std::mem;

use log::{debug, trace};
use num_traits::Float;

use crate::lin::Lin;
use crate::point::{Minimum, Point, Record};
use crate::wolfe::WolfeLineSearch;

/// Steepest descent with a fixed learning rate: `x <- x - learn_rate * f'(x)`.
#[derive(Debug, Clone)]
pub struct GradientDescent<S: Float> {
    pub learn_rate: S,
    /// Desired norm of the gradient
    pub grad_norm_tol: S,
    /// Maximum number of steps; `None` means `100 * dim(x0)`
    pub max_iter: Option<usize>,
}

impl GradientDescent<f32> {
    pub fn new() -> Self {
        GradientDescent {
            learn_rate: 0.001,
            grad_norm_tol: 1e-5,
            max_iter: None,
        }
    }
}

impl GradientDescent<f64> {
    pub fn new() -> Self {
        GradientDescent {
            learn_rate: 0.001,
            grad_norm_tol: 1e-5,
            max_iter: None,
        }
    }
}

impl Default for GradientDescent<f32> {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for GradientDescent<f64> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Float + Debug> GradientDescent<S> {
    pub fn minimize<Func, V>(&self, x0: &V, f: Func) -> Minimum<V, S>
        where Func: FnMut(&V, &mut V) -> S,
              V: Lin<S = S> + Clone {
        self.run(x0, f, None)
    }

    /// The same as `minimize`, but appends a snapshot of every evaluated
    /// point to `history`.
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
        let max_iter = self.max_iter.unwrap_or(100 * x0.dimension());

        let mut current = Point::evaluate(x0.clone(), &mut f);
        let mut iterations = 0;

        // the point is evaluated again after every step, so the result is
        // consistent even when the budget runs out
        let converged = loop {
            if let Some(h) = history.as_mut() {
                h.push(current.snapshot(self.learn_rate, Vec::new()));
            }

            if current.fxprime.norm() <= self.grad_norm_tol {
                break true;
            }
            if iterations == max_iter {
                break false;
            }

            current.x.ray_to(&current.fxprime, -self.learn_rate);
            current.fx = f(&current.x, &mut current.fxprime);
            iterations += 1;
            trace!("gradient descent: iteration {}, fx = {:?}", iterations, current.fx);
        };

        debug!("gradient descent: {} after {} iterations, fx = {:?}",
               if converged { "converged" } else { "stopped" }, iterations, current.fx);
        current.into_minimum(iterations, converged)
    }
}

/// Steepest descent with the step length chosen by a strong Wolfe line search.
#[derive(Debug, Clone)]
pub struct LineSearchDescent<S: Float> {
    /// Parameters for the line search
    pub line_search: WolfeLineSearch<S>,
    /// Initial step of the first line search; later searches start from the
    /// step found by the previous one.
    pub alpha0: S,
    /// Desired norm of the gradient
    pub grad_norm_tol: S,
    /// Maximum number of iterations; `None` means `100 * dim(x0)`
    pub max_iter: Option<usize>,
}

impl LineSearchDescent<f32> {
    pub fn new() -> Self {
        LineSearchDescent {
            line_search: WolfeLineSearch { c1: 1e-3, ..WolfeLineSearch::<f32>::new() },
            alpha0: 1.,
            grad_norm_tol: 1e-5,
            max_iter: None,
        }
    }
}

impl LineSearchDescent<f64> {
    pub fn new() -> Self {
        LineSearchDescent {
            line_search: WolfeLineSearch { c1: 1e-3, ..WolfeLineSearch::<f64>::new() },
            alpha0: 1.,
            grad_norm_tol: 1e-5,
            max_iter: None,
        }
    }
}

impl Default for LineSearchDescent<f32> {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for LineSearchDescent<f64> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Float + Debug> LineSearchDescent<S> {
    pub fn minimize<Func, V>(&self, x0: &V, f: Func) -> Minimum<V, S>
        where Func: FnMut(&V, &mut V) -> S,
              V: Lin<S = S> + Clone {
        self.run(x0, f, None)
    }

    /// The same as `minimize`, but appends a snapshot of the current point to
    /// `history` after every line search. Each snapshot also lists all the
    /// points at which `f` was evaluated during its iteration (the first one
    /// includes `x0`).
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
        let max_iter = self.max_iter.unwrap_or(100 * x0.dimension());
        let recording = history.is_some();

        let mut current = Point::evaluate(x0.clone(), &mut f);
        let mut next = current.clone();
        let mut pk = x0.origin();
        let mut function_calls = Vec::new();
        if recording {
            function_calls.push(x0.clone());
        }

        let mut alpha = self.alpha0;
        let mut converged = current.fxprime.norm() <= self.grad_norm_tol;
        let mut iterations = 0;

        while !converged && iterations < max_iter {
            pk.clone_from(&current.fxprime);
            pk.scale(-S::one());

            let samples = if recording { Some(&mut function_calls) } else { None };
            alpha = self.line_search.search(&mut f, &pk, &current, &mut next, alpha, samples);
            iterations += 1;

            if let Some(h) = history.as_mut() {
                h.push(current.snapshot(alpha, mem::replace(&mut function_calls, Vec::new())));
            }

            if alpha == S::zero() {
                // `next` holds a rejected sample, keep `current`
                debug!("line search descent: line search failed in iteration {}", iterations);
                break;
            }

            mem::swap(&mut current, &mut next);
            trace!("line search descent: iteration {}, fx = {:?}, alpha = {:?}",
                   iterations, current.fx, alpha);
            converged = current.fxprime.norm() <= self.grad_norm_tol;
        }

        debug!("line search descent: {} after {} iterations, fx = {:?}",
               if converged { "converged" } else { "stopped" }, iterations, current.fx);
        current.into_minimum(iterations, converged)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lin::Rn;

    fn quad1d(x: &Rn<f64>, grad: &mut Rn<f64>) -> f64 {
        grad[0] = 2. * (x[0] - 10.);
        (x[0] - 10.) * (x[0] - 10.)
    }

    #[test]
    fn fixed_rate_exact_step() {
        // with learning rate 1/2 a single step reaches the minimum
        let m = GradientDescent { learn_rate: 0.5, ..GradientDescent::<f64>::new() };
        let mut history = vec![];
        let r = m.minimize_with_history(&Rn::new(vec![0.]), quad1d, &mut history);

        assert!(r.converged);
        assert_eq!(r.iterations, 1);
        assert_eq!(r.x, Rn::new(vec![10.]));
        assert_eq!(r.fx, 0.);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].fx, 100.);
        assert_eq!(history[0].alpha, 0.5);
    }

    #[test]
    fn fixed_rate_budget() {
        let m = GradientDescent { max_iter: Some(3), ..GradientDescent::<f64>::new() };
        let r = m.minimize(&Rn::new(vec![0.]), quad1d);

        assert!(!r.converged);
        assert_eq!(r.iterations, 3);
        // fx and fxprime belong to the returned x
        let mut g = r.x.clone();
        assert_eq!(quad1d(&r.x, &mut g), r.fx);
        assert_eq!(g, r.fxprime);
    }

    #[test]
    fn fixed_rate_default_budget() {
        let m = GradientDescent::<f64>::new();
        let mut calls = 0;
        let r = m.minimize(&Rn::new(vec![0.]), |x, g| { calls += 1; quad1d(x, g) });

        // 100 * dim steps are far too few at learning rate 0.001
        assert!(!r.converged);
        assert_eq!(r.iterations, 100);
        assert_eq!(calls, 101);
    }

    #[test]
    fn line_search_quadratic() {
        let m = LineSearchDescent::<f64>::new();
        let r = m.minimize(&Rn::new(vec![0.]), quad1d);

        assert!(r.converged);
        assert_eq!(r.x, Rn::new(vec![10.]));
        assert_eq!(r.iterations, 1);
    }

    #[test]
    fn line_search_records_samples() {
        let m = LineSearchDescent::<f64>::new();
        let mut history = vec![];
        let mut calls = 0;
        let r = m.minimize_with_history(&Rn::new(vec![0.]),
                                        |x, g| { calls += 1; quad1d(x, g) },
                                        &mut history);

        assert_eq!(history.len(), r.iterations);
        let recorded: usize = history.iter().map(|h| h.function_calls.len()).sum();
        assert_eq!(recorded, calls);
        assert_eq!(history[0].function_calls[0], Rn::new(vec![0.]));
        // x0 - 20 overshoots, the bisection hits the minimum
        assert_eq!(history[0].function_calls[1..], [Rn::new(vec![20.]), Rn::new(vec![10.])]);
        assert_eq!(history[0].alpha, 0.5);
    }

    #[test]
    fn line_search_stops_on_failure() {
        let m = LineSearchDescent::<f64>::new();
        // the reported gradient points the wrong way
        let f = |x: &Rn<f64>, g: &mut Rn<f64>| { g[0] = -2. * x[0]; x[0] * x[0] };
        let r = m.minimize(&Rn::new(vec![1.]), f);

        assert!(!r.converged);
        assert_eq!(r.iterations, 1);
        assert_eq!(r.x, Rn::new(vec![1.]));
        assert_eq!(r.fx, 1.);
    }
}
