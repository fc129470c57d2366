//! Quadrature rules in physical coordinates.
use crate::error::FaceInterpolationError;
use crate::Real;
use itertools::izip;
use nalgebra::{convert, try_convert, Point2, Scalar};
use std::ops::{AddAssign, Mul};

/// Errors returned by the quadrature generators.
pub use face_quadrature::Error as QuadratureError;

/// A quadrature rule in the plane, consisting of weights and points.
pub trait Quadrature<T: Scalar> {
    fn weights(&self) -> &[T];
    fn points(&self) -> &[Point2<T>];

    fn len(&self) -> usize {
        self.weights().len()
    }

    fn is_empty(&self) -> bool {
        self.weights().is_empty()
    }

    /// Approximates the integral of the given function using this quadrature rule.
    fn integrate<U, Function>(&self, f: Function) -> U
    where
        Function: Fn(&Point2<T>) -> U,
        U: num::Zero + Mul<T, Output = U> + AddAssign<U>,
    {
        let mut integral = U::zero();
        for (w, p) in izip!(self.weights(), self.points()) {
            integral += f(p) * w.clone();
        }
        integral
    }
}

impl<T, A, B> Quadrature<T> for (A, B)
where
    T: Scalar,
    A: AsRef<[T]>,
    B: AsRef<[Point2<T>]>,
{
    fn weights(&self) -> &[T] {
        self.0.as_ref()
    }

    fn points(&self) -> &[Point2<T>] {
        self.1.as_ref()
    }
}

impl<T, X> Quadrature<T> for &X
where
    T: Scalar,
    X: Quadrature<T>,
{
    fn weights(&self) -> &[T] {
        X::weights(self)
    }

    fn points(&self) -> &[Point2<T>] {
        X::points(self)
    }
}

/// An owned quadrature rule whose weights integrate in physical coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule<T: Scalar> {
    weights: Vec<T>,
    points: Vec<Point2<T>>,
}

impl<T: Scalar> Quadrature<T> for QuadratureRule<T> {
    fn weights(&self) -> &[T] {
        &self.weights
    }

    fn points(&self) -> &[Point2<T>] {
        &self.points
    }
}

impl<T: Real> QuadratureRule<T> {
    /// Creates a rule from weights and points.
    ///
    /// Fails if the two arrays have different lengths or the rule is empty.
    pub fn from_weights_and_points(weights: Vec<T>, points: Vec<Point2<T>>) -> Result<Self, FaceInterpolationError> {
        if weights.len() != points.len() {
            return Err(FaceInterpolationError::InvalidConfiguration(format!(
                "quadrature has {} weights but {} points",
                weights.len(),
                points.len()
            )));
        }
        if weights.is_empty() {
            return Err(FaceInterpolationError::InvalidConfiguration(
                "quadrature must have at least one point".to_string(),
            ));
        }
        Ok(Self { weights, points })
    }

    /// Gauss rule on the segment from `a` to `b`.
    pub fn segment_gauss(a: &Point2<T>, b: &Point2<T>, num_points: usize) -> Result<Self, QuadratureError> {
        let rule = face_quadrature::segment_gauss(to_f64(a), to_f64(b), num_points)?;
        Ok(Self::from(rule))
    }

    /// Tensor Gauss rule on the axis-aligned rectangle spanned by `min` and `max`.
    pub fn rectangle_gauss(
        min: &Point2<T>,
        max: &Point2<T>,
        num_points_per_dim: usize,
    ) -> Result<Self, QuadratureError> {
        let rule = face_quadrature::rectangle_gauss(to_f64(min), to_f64(max), num_points_per_dim)?;
        Ok(Self::from(rule))
    }
}

fn to_f64<T: Real>(x: &Point2<T>) -> [f64; 2] {
    // Unrepresentable coordinates become NaN and are rejected as degenerate domains
    let coord = |v: T| try_convert(v).unwrap_or(f64::NAN);
    [coord(x.x), coord(x.y)]
}

impl<T: Real> From<face_quadrature::Rule2d> for QuadratureRule<T> {
    fn from((weights, points): face_quadrature::Rule2d) -> Self {
        Self {
            weights: weights.into_iter().map(convert).collect(),
            points: points
                .into_iter()
                .map(|[x, y]| Point2::new(convert(x), convert(y)))
                .collect(),
        }
    }
}
