//! Gradient based minimization of nonlinear functions and a conjugate
//! gradient solver for symmetric positive definite linear systems.
//!
//! The objective provides its value and writes its gradient into the buffer
//! it is given:
//!
//! ```rust
//! use fmin::{NonlinearCG, Rn};
//!
//! let booth = |x: &Rn<f64>, g: &mut Rn<f64>| {
//!     let (u, v) = (x[0] + 2. * x[1] - 7., 2. * x[0] + x[1] - 5.);
//!     g[0] = 2. * u + 4. * v;
//!     g[1] = 4. * u + 2. * v;
//!     u * u + v * v
//! };
//!
//! let m = NonlinearCG::<f64>::new().minimize(&Rn::new(vec![0., 0.]), booth);
//! assert!(m.converged);
//! assert!((m.x[0] - 1.).abs() < 1e-5 && (m.x[1] - 3.).abs() < 1e-5);
//! ```

mod gd;
mod lin;
mod linear_cg;
mod ncg;
mod point;
mod wolfe;

pub use gd::{GradientDescent, LineSearchDescent};
pub use lin::{gemv, Lin, Rn};
pub use linear_cg::{LinearCG, LinearCGError, LinearCGRecord, LinearCGReport};
pub use ncg::NonlinearCG;
pub use point::{Minimum, Point, Record};
pub use wolfe::WolfeLineSearch;
