//! Conjugate gradient method for linear systems `Ax = b` with a symmetric
//! positive definite matrix `A`.

use std::fmt::Debug;

use log::{debug, trace, warn};
use ndarray::{Array1, Array2};
use num_traits::Float;
use thiserror::Error;

use crate::lin::{gemv, Lin};

/// Linear conjugate gradient solver.
///
/// In exact arithmetic the method converges in at most `n` iterations for an
/// `n x n` symmetric positive definite system.
#[derive(Debug, Clone)]
pub struct LinearCG<S: Float> {
    /// Desired norm of the residual `b - Ax`
    pub tol: S,
    /// Maximum number of iterations; `None` means the dimension of the system
    pub max_iter: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinearCGError {
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("vector of length {found} does not match a system of dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Information about a finished solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearCGReport<S> {
    /// Number of iterations performed
    pub iterations: usize,
    /// Norm of the residual `b - Ax` as tracked by the recurrence
    pub residual_norm: S,
    /// Last step length, `0` if no iteration was performed
    pub alpha: S,
    /// Whether `residual_norm <= tol`
    pub converged: bool,
}

/// Snapshot of one iteration: the point and the direction it is about to
/// move along with step `alpha`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearCGRecord<S> {
    pub x: Array1<S>,
    pub p: Array1<S>,
    pub alpha: S,
}

impl LinearCG<f32> {
    pub fn new() -> Self {
        LinearCG { tol: 1e-10, max_iter: None }
    }
}

impl LinearCG<f64> {
    pub fn new() -> Self {
        LinearCG { tol: 1e-10, max_iter: None }
    }
}

impl Default for LinearCG<f32> {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for LinearCG<f64> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Float + Debug> LinearCG<S> {
    /// Solve `a x = b` in place, using the value of `x` as the initial guess.
    ///
    /// Running out of iterations is not an error; check the returned report.
    pub fn solve(&self,
                 a: &Array2<S>,
                 b: &Array1<S>,
                 x: &mut Array1<S>) -> Result<LinearCGReport<S>, LinearCGError> {
        self.run(a, b, x, None)
    }

    /// The same as `solve`, but records `x`, the search direction and the
    /// step before every update, and a final snapshot of the solution.
    pub fn solve_with_history(&self,
                              a: &Array2<S>,
                              b: &Array1<S>,
                              x: &mut Array1<S>,
                              history: &mut Vec<LinearCGRecord<S>>)
                              -> Result<LinearCGReport<S>, LinearCGError> {
        self.run(a, b, x, Some(history))
    }

    fn run(&self,
           a: &Array2<S>,
           b: &Array1<S>,
           x: &mut Array1<S>,
           mut history: Option<&mut Vec<LinearCGRecord<S>>>)
           -> Result<LinearCGReport<S>, LinearCGError> {
        let n = check_shapes(a, b, x)?;
        let max_iter = self.max_iter.unwrap_or(n);

        // r = b - A x
        let mut ap = x.origin();
        gemv(&mut ap, a, x);
        let mut r = b.clone();
        r.ray_to(&ap, -S::one());
        let mut p = r.clone();

        let mut rs_old = Lin::dot(&r, &r);
        let mut rs_new = rs_old;
        let mut alpha = S::zero();
        let mut iterations = 0;
        let mut converged = rs_old.sqrt() <= self.tol;

        while !converged && iterations < max_iter {
            gemv(&mut ap, a, &p);
            let p_ap = Lin::dot(&p, &ap);
            if p_ap <= S::zero() {
                warn!("linear CG: non-positive curvature {:?}, the matrix is not positive definite", p_ap);
                if p_ap == S::zero() {
                    break;
                }
            }
            alpha = rs_old / p_ap;

            if let Some(h) = history.as_mut() {
                h.push(LinearCGRecord { x: x.clone(), p: p.clone(), alpha: alpha });
            }

            x.ray_to(&p, alpha);
            r.ray_to(&ap, -alpha);
            rs_new = Lin::dot(&r, &r);
            iterations += 1;
            trace!("linear CG: iteration {}, residual = {:?}", iterations, rs_new.sqrt());

            if rs_new.sqrt() <= self.tol {
                converged = true;
                break;
            }

            // p = r + (rs_new / rs_old) p
            p.combine(rs_new / rs_old, &r, S::one());
            rs_old = rs_new;
        }

        if let Some(h) = history.as_mut() {
            h.push(LinearCGRecord { x: x.clone(), p: p, alpha: alpha });
        }

        debug!("linear CG: {} after {} iterations, residual = {:?}",
               if converged { "converged" } else { "stopped" }, iterations, rs_new.sqrt());
        Ok(LinearCGReport {
            iterations: iterations,
            residual_norm: rs_new.sqrt(),
            alpha: alpha,
            converged: converged,
        })
    }
}

fn check_shapes<S>(a: &Array2<S>, b: &Array1<S>, x: &Array1<S>) -> Result<usize, LinearCGError> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(LinearCGError::NotSquare { rows: rows, cols: cols });
    }
    for v in &[b, x] {
        if v.len() != rows {
            return Err(LinearCGError::DimensionMismatch { expected: rows, found: v.len() });
        }
    }
    Ok(rows)
}
