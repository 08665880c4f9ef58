//! Implementation of a basic linear space trait.
//!
//! The main interface is `Lin` with implementations for a vector of real
//! numbers `Rn<F>`, for `ndarray::Array1<F>` and for the scalars `f32`, `f64`.
//!
//! ```rust
//! use fmin::{Lin, Rn};
//!
//! let x = Rn::new(vec![1., 2.]);
//! let mut y = Rn::new(vec![2., -3.]);
//!
//! assert_eq!(x.dot(&y), -4.);
//! y.ray_to(&x, 2.);
//! assert_eq!(y, Rn::new(vec![4., 1.]));
//! ```
use ndarray::{Array1, Array2};
use num_traits::Float;
use std::ops::{Deref, DerefMut};

/// Trait defining basic operations for an element of a linear space.
///
/// The focus is on operations _in place_: methods that return a `Lin` object
/// modify the object in place. The optimizers only ever call these, so they
/// never allocate inside their iteration loops.
///
/// Mixing vectors of different dimensions is a programming error and panics.
pub trait Lin {
    /// Scalars for this linear space.
    type S: Float;

    /// Dot product (inner product).
    fn dot(&self, other: &Self) -> Self::S;

    /// Multiplication by a constant.
    fn scale(&mut self, a: Self::S) -> &mut Self;

    /// Adds a vector multiplied by a constant to this vector.
    fn ray_to(&mut self, other: &Self, t: Self::S) -> &mut Self;

    /// Creates a linear combination `a * self + b * other`.
    fn combine(&mut self, a: Self::S, other: &Self, b: Self::S) -> &mut Self;

    /// Return the origin of the vector space to which self belongs too.
    fn origin(&self) -> Self;

    /// Number of coordinates.
    fn dimension(&self) -> usize;

    /// Norm of the vector.
    fn norm(&self) -> Self::S {
        self.norm_squared().sqrt()
    }

    /// Square of the norm.
    fn norm_squared(&self) -> Self::S {
        self.dot(self)
    }
}

/// An implementation of the Lin trait: an n-dimensional real vector.
///
/// Backed by a `Vec<F>`, where `F` is `Float`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rn<F: Float> {
    vec: Vec<F>,
}

impl<F: Float> Rn<F> {
    pub fn new(v: Vec<F>) -> Self {
        Rn { vec: v }
    }

    pub fn into_inner(self) -> Vec<F> {
        self.vec
    }
}

impl<F: Float> From<Vec<F>> for Rn<F> {
    fn from(v: Vec<F>) -> Self {
        Rn::new(v)
    }
}

impl<F: Float> Deref for Rn<F> {
    type Target = Vec<F>;

    fn deref(&self) -> &Vec<F> {
        &self.vec
    }
}

impl<F: Float> DerefMut for Rn<F> {
    fn deref_mut(&mut self) -> &mut Vec<F> {
        &mut self.vec
    }
}

// Accumulates left to right starting from zero, which keeps the results
// reproducible between the different implementations below.
fn dot_slices<'a, F, I, J>(a: I, b: J) -> F
where
    F: Float + 'a,
    I: Iterator<Item = &'a F>,
    J: Iterator<Item = &'a F>,
{
    a.zip(b).fold(F::zero(), |sum, (&x, &y)| sum + x * y)
}

impl<F: Float> Lin for Rn<F> {
    type S = F;

    fn dot(&self, other: &Self) -> F {
        assert_eq!(self.len(), other.len());
        dot_slices(self.iter(), other.iter())
    }

    fn scale(&mut self, a: F) -> &mut Self {
        for x in self.iter_mut() {
            *x = *x * a;
        }
        self
    }

    fn ray_to(&mut self, other: &Self, b: F) -> &mut Self {
        assert_eq!(self.len(), other.len());
        for (x, y) in self.iter_mut().zip(other.iter()) {
            *x = *x + *y * b;
        }
        self
    }

    fn combine(&mut self, a: F, other: &Self, b: F) -> &mut Self {
        assert_eq!(self.len(), other.len());
        for (x, y) in self.iter_mut().zip(other.iter()) {
            *x = *x * a + *y * b;
        }
        self
    }

    fn origin(&self) -> Self {
        Rn::new(vec![F::zero(); self.len()])
    }

    fn dimension(&self) -> usize {
        self.len()
    }
}

impl<F: Float> Lin for Array1<F> {
    type S = F;

    fn dot(&self, other: &Self) -> F {
        assert_eq!(self.len(), other.len());
        dot_slices(self.iter(), other.iter())
    }

    fn scale(&mut self, a: F) -> &mut Self {
        self.mapv_inplace(|x| x * a);
        self
    }

    fn ray_to(&mut self, other: &Self, b: F) -> &mut Self {
        assert_eq!(self.len(), other.len());
        for (x, y) in self.iter_mut().zip(other.iter()) {
            *x = *x + *y * b;
        }
        self
    }

    fn combine(&mut self, a: F, other: &Self, b: F) -> &mut Self {
        assert_eq!(self.len(), other.len());
        for (x, y) in self.iter_mut().zip(other.iter()) {
            *x = *x * a + *y * b;
        }
        self
    }

    fn origin(&self) -> Self {
        Array1::from_elem(self.len(), F::zero())
    }

    fn dimension(&self) -> usize {
        self.len()
    }
}

// Scalars form a one dimensional linear space over themselves.
macro_rules! impl_lin_scalar {
    ($($t:ty),*) => {$(
        impl Lin for $t {
            type S = $t;

            fn dot(&self, other: &Self) -> $t {
                *self * *other
            }

            fn scale(&mut self, a: $t) -> &mut Self {
                *self = *self * a;
                self
            }

            fn ray_to(&mut self, other: &Self, b: $t) -> &mut Self {
                *self = *self + *other * b;
                self
            }

            fn combine(&mut self, a: $t, other: &Self, b: $t) -> &mut Self {
                *self = *self * a + *other * b;
                self
            }

            fn origin(&self) -> Self {
                0.
            }

            fn dimension(&self) -> usize {
                1
            }

            fn norm(&self) -> $t {
                self.abs()
            }
        }
    )*};
}

impl_lin_scalar!(f32, f64);

/// Dense matrix-vector product `out = a * x`.
///
/// Panics if the shapes do not agree.
pub fn gemv<F: Float>(out: &mut Array1<F>, a: &Array2<F>, x: &Array1<F>) {
    assert_eq!(a.ncols(), x.len());
    assert_eq!(a.nrows(), out.len());
    for (o, row) in out.iter_mut().zip(a.outer_iter()) {
        *o = dot_slices(row.iter(), x.iter());
    }
}
