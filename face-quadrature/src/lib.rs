//! Gauss quadrature rules for the faces and cells of structured two-dimensional meshes.
//!
//! Rules are produced on the reference interval `[-1, 1]` and the reference square `[-1, 1]^2`
//! and can be mapped onto physical segments and axis-aligned rectangles. The weights of mapped
//! rules include the Jacobian determinant of the mapping, so that they integrate directly in
//! physical coordinates.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod tensor;
pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A rule with zero points was requested.
    EmptyRule,
    /// The physical domain a rule was mapped onto has zero or negative measure.
    DegenerateDomain,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRule => write!(f, "A quadrature rule must have at least one point"),
            Self::DegenerateDomain => write!(f, "Cannot map a quadrature rule onto a domain of zero measure"),
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A two-dimensional point.
pub type Point2 = Point<2>;

/// A D-dimensional rule, stored as `(weights, points)`.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// A one-dimensional rule.
pub type Rule1d = Rule<1>;

/// A two-dimensional rule.
pub type Rule2d = Rule<2>;

/// Approximates the integral of `f` with the given rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights
        .iter()
        .zip(points)
        .map(|(w, x)| w * f(x))
        .sum()
}

/// Gauss rule with `num_points` points on the straight segment from `a` to `b` in the plane.
///
/// The weights sum to the length of the segment.
pub fn segment_gauss(a: Point2, b: Point2, num_points: usize) -> Result<Rule2d, Error> {
    let (weights, points) = univariate::try_gauss(num_points)?;
    let half = [0.5 * (b[0] - a[0]), 0.5 * (b[1] - a[1])];
    let half_length = (half[0] * half[0] + half[1] * half[1]).sqrt();
    if !(half_length > 0.0) {
        return Err(Error::DegenerateDomain);
    }
    let mid = [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1])];

    let points = points
        .iter()
        .map(|&[xi]| [mid[0] + xi * half[0], mid[1] + xi * half[1]])
        .collect();
    let weights = weights.iter().map(|w| w * half_length).collect();
    Ok((weights, points))
}

/// Tensor Gauss rule with `num_points_per_dim` points per direction on the axis-aligned
/// rectangle with lower corner `min` and upper corner `max`.
///
/// The weights sum to the area of the rectangle.
pub fn rectangle_gauss(min: Point2, max: Point2, num_points_per_dim: usize) -> Result<Rule2d, Error> {
    let half = [0.5 * (max[0] - min[0]), 0.5 * (max[1] - min[1])];
    if !(half[0] > 0.0 && half[1] > 0.0) {
        return Err(Error::DegenerateDomain);
    }
    if num_points_per_dim == 0 {
        return Err(Error::EmptyRule);
    }
    let mid = [0.5 * (min[0] + max[0]), 0.5 * (min[1] + max[1])];
    let jacobian_det = half[0] * half[1];

    let (weights, points) = tensor::quadrilateral_gauss(num_points_per_dim);
    let points = points
        .iter()
        .map(|&[xi, eta]| [mid[0] + xi * half[0], mid[1] + eta * half[1]])
        .collect();
    let weights = weights.iter().map(|w| w * jacobian_det).collect();
    Ok((weights, points))
}
