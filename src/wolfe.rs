//! Line search for a step satisfying the strong Wolfe conditions.
//!
//! Bracketing by doubling the step followed by bisection of the bracket
//! ("zoom"), see _Nocedal & Wright, Numerical Optimization_, p. 59--60.

use std::fmt::Debug;

use log::{debug, trace};
use num_traits::Float;

use crate::lin::Lin;
use crate::point::Point;

/// Strong Wolfe line search.
///
/// With `ϕ(a) = f(x + a p)` a step `a` is accepted when
///
///  - `ϕ(a) ≤ ϕ(0) + c1 a ϕ'(0)` (sufficient decrease), and
///  - `|ϕ'(a)| ≤ -c2 ϕ'(0)` (curvature).
#[derive(Debug, Clone)]
pub struct WolfeLineSearch<S: Float> {
    /// `c1` for the sufficient decrease condition
    pub c1: S,
    /// `c2` for the curvature condition
    pub c2: S,
    /// Maximum number of step doublings while looking for a bracket
    pub max_bracket_iter: usize,
    /// Maximum number of bisections of the bracket
    pub max_zoom_iter: usize,
}

impl Default for WolfeLineSearch<f32> {
    fn default() -> Self {
        WolfeLineSearch {
            c1: 1e-6,
            c2: 0.1,
            max_bracket_iter: 10,
            max_zoom_iter: 16,
        }
    }
}

impl Default for WolfeLineSearch<f64> {
    fn default() -> Self {
        WolfeLineSearch {
            c1: 1e-6,
            c2: 0.1,
            max_bracket_iter: 10,
            max_zoom_iter: 16,
        }
    }
}

impl WolfeLineSearch<f32> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl WolfeLineSearch<f64> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<S: Float + Debug> WolfeLineSearch<S> {
    /// Search along the direction `pk` from `current` for a step satisfying
    /// the strong Wolfe conditions, starting with the step `a`.
    ///
    /// Every trial point is evaluated into `next`, so on success `next` holds
    /// the accepted point, its value and gradient. If `samples` is provided,
    /// every trial point is also pushed onto it.
    ///
    /// Returns the accepted step, or `0` if no step satisfying both conditions
    /// was found within the iteration budget. In that case `next` holds the
    /// last trial point, which should not be accepted.
    pub fn search<Func, V>(&self,
                           f: &mut Func,
                           pk: &V,
                           current: &Point<V, S>,
                           next: &mut Point<V, S>,
                           a: S,
                           mut samples: Option<&mut Vec<V>>) -> S
        where Func: FnMut(&V, &mut V) -> S,
              V: Lin<S = S> + Clone {
        let phi0 = current.fx;
        let dphi0 = current.fxprime.dot(pk);

        // ϕ(a), ϕ'(a), leaving the sample in `next`
        let mut phi = |a: S| {
            next.x.clone_from(&current.x);
            next.x.ray_to(pk, a);
            next.fx = f(&next.x, &mut next.fxprime);
            if let Some(s) = samples.as_mut() {
                s.push(next.x.clone());
            }
            let dphi = next.fxprime.dot(pk);
            trace!("wolfe: a = {:?}, phi = {:?}, dphi = {:?}", a, next.fx, dphi);
            (next.fx, dphi)
        };

        let mut a = a;
        let mut a_prev = S::zero();
        let mut phi_prev = phi0;

        for k in 0..self.max_bracket_iter {
            let (phi_a, dphi_a) = phi(a);

            if !self.sufficient_decrease(phi_a, a, phi0, dphi0) || (k > 0 && phi_a >= phi_prev) {
                return self.zoom(&mut phi, a_prev, a, phi_prev, phi0, dphi0);
            }

            if self.curvature(dphi_a, dphi0) {
                return a;
            }

            if dphi_a >= S::zero() {
                // ϕ increases at `a`: the bracket is `[a_prev, a]` seen from `a`
                return self.zoom(&mut phi, a, a_prev, phi_a, phi0, dphi0);
            }

            phi_prev = phi_a;
            a_prev = a;
            a = a + a;
        }

        // Every trial decreased ϕ sufficiently; `next` holds the last of them.
        debug!("wolfe: no bracket after {} doublings, taking a = {:?}",
               self.max_bracket_iter, a_prev);
        a_prev
    }

    // Bisection of the bracket between `a_lo` and `a_hi`; `a_lo` is the end
    // with the lower value `phi_lo`, the ends are not ordered.
    fn zoom<P>(&self,
               phi: &mut P,
               mut a_lo: S,
               mut a_hi: S,
               mut phi_lo: S,
               phi0: S,
               dphi0: S) -> S
        where P: FnMut(S) -> (S, S) {
        let two = S::one() + S::one();

        for _ in 0..self.max_zoom_iter {
            let a = (a_lo + a_hi) / two;
            let (phi_a, dphi_a) = phi(a);

            if !self.sufficient_decrease(phi_a, a, phi0, dphi0) || phi_a >= phi_lo {
                a_hi = a;
            } else {
                if self.curvature(dphi_a, dphi0) {
                    return a;
                }

                if dphi_a * (a_hi - a_lo) >= S::zero() {
                    a_hi = a_lo;
                }

                a_lo = a;
                phi_lo = phi_a;
            }
        }

        debug!("wolfe: zoom failed after {} bisections", self.max_zoom_iter);
        S::zero()
    }

    fn sufficient_decrease(&self, phi_a: S, a: S, phi0: S, dphi0: S) -> bool {
        phi_a <= phi0 + self.c1 * a * dphi0
    }

    fn curvature(&self, dphi_a: S, dphi0: S) -> bool {
        dphi_a.abs() <= -self.c2 * dphi0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{quickcheck, TestResult};

    fn start<Func>(x: f64, f: &mut Func) -> (Point<f64, f64>, Point<f64, f64>)
        where Func: FnMut(&f64, &mut f64) -> f64 {
        let current = Point::evaluate(x, f);
        let next = current.clone();
        (current, next)
    }

    #[test]
    fn quadratic_zoom() {
        let s = WolfeLineSearch::<f64>::new();
        let mut f = |x: &f64, g: &mut f64| { *g = 2. * (x - 3.); (x - 3.) * (x - 3.) };
        let (current, mut next) = start(0., &mut f);
        let pk = -current.fxprime;

        let a = s.search(&mut f, &pk, &current, &mut next, 1., None);

        assert_eq!(a, 0.5);
        assert_eq!(next.x, 3.);
        assert_eq!(next.fx, 0.);
    }

    #[test]
    fn doubles_until_bracketed() {
        let s = WolfeLineSearch::<f64>::new();
        let mut f = |x: &f64, g: &mut f64| { *g = 2. * (x - 100.); (x - 100.).powi(2) };
        let (current, mut next) = start(0., &mut f);
        let mut samples = vec![];

        let a = s.search(&mut f, &1., &current, &mut next, 1., Some(&mut samples));

        // 1, 2, ..., 128 overshoots and the first bisection lands on 96
        assert_eq!(a, 96.);
        assert_eq!(samples, vec![1., 2., 4., 8., 16., 32., 64., 128., 96.]);
        assert_eq!(next.x, 96.);
        assert_eq!(next.fxprime, -8.);
    }

    #[test]
    fn ascent_direction_fails() {
        let s = WolfeLineSearch::<f64>::new();
        let mut f = |x: &f64, g: &mut f64| { *g = 2. * x; x * x };
        let (current, mut next) = start(1., &mut f);
        let mut samples = vec![];

        // gradient has wrong sign
        let a = s.search(&mut f, &1., &current, &mut next, 1., Some(&mut samples));

        assert_eq!(a, 0.);
        // one bracketing trial and the whole zoom budget
        assert_eq!(samples.len(), 1 + s.max_zoom_iter);
    }

    #[test]
    fn unbounded_slice_takes_last_doubling() {
        let s = WolfeLineSearch::<f64>::new();
        let mut f = |x: &f64, g: &mut f64| { *g = -1.; -x };
        let (current, mut next) = start(0., &mut f);
        let mut samples = vec![];

        let a = s.search(&mut f, &1., &current, &mut next, 1., Some(&mut samples));

        assert_eq!(a, 512.);
        assert_eq!(next.x, 512.);
        assert_eq!(next.fx, -512.);
        let doublings: Vec<f64> = (0..s.max_bracket_iter).map(|k| (1u32 << k) as f64).collect();
        assert_eq!(samples, doublings);
    }

    #[test]
    fn flat_direction_accepts_first_step() {
        let s = WolfeLineSearch::<f64>::new();
        let mut f = |x: &f64, g: &mut f64| { *g = 0.; 1. + 0. * x };
        let (current, mut next) = start(2., &mut f);

        let a = s.search(&mut f, &0., &current, &mut next, 1., None);

        assert_eq!(a, 1.);
        assert_eq!(next.x, 2.);
    }

    #[test]
    fn convex_slices_satisfy_wolfe() {
        fn prop(k: f64, m: f64, x: f64, a0: f64) -> TestResult {
            let k = 0.5 + k.abs();
            let a0 = 0.01 + a0.abs() / 100.;
            if (x - m).abs() < 1e-3 {
                return TestResult::discard();
            }

            let s = WolfeLineSearch::<f64>::new();
            let mut f = |x: &f64, g: &mut f64| { *g = 2. * k * (x - m); k * (x - m) * (x - m) };
            let (current, mut next) = start(x, &mut f);
            let pk = -current.fxprime;

            let a = s.search(&mut f, &pk, &current, &mut next, a0, None);

            let mut g = 0.;
            let fx = f(&(x + a * pk), &mut g);
            let dphi0 = current.fxprime * pk;
            TestResult::from_bool(a > 0.
                && fx <= current.fx + s.c1 * a * dphi0
                && (g * pk).abs() <= -s.c2 * dphi0)
        }
        quickcheck(prop as fn(f64, f64, f64, f64) -> TestResult);
    }
}
