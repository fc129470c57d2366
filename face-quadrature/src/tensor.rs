//! Tensor product rules for the reference square `[-1, 1]^2`.

use crate::univariate::gauss;
use crate::Rule2d;

/// A Gauss quadrature rule for the reference square.
///
/// The rule is constructed as a tensor product of 1D Gauss rules, with the provided number of
/// points per dimension. Points are ordered with the `x` coordinate varying slowest.
///
/// # Panics
///
/// Panics if zero points per dimension are requested.
pub fn quadrilateral_gauss(num_points_per_dim: usize) -> Rule2d {
    let n = num_points_per_dim;
    let (weights1d, points1d) = gauss(n);
    let mut weights2d = Vec::with_capacity(n * n);
    let mut points2d = Vec::with_capacity(n * n);

    let rule1d_iter = || weights1d.iter().zip(&points1d);

    for (&wx, &[x]) in rule1d_iter() {
        for (&wy, &[y]) in rule1d_iter() {
            weights2d.push(wx * wy);
            points2d.push([x, y]);
        }
    }

    (weights2d, points2d)
}
