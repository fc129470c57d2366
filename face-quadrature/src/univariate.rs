//! Quadrature rules for the one-dimensional domain `[-1, 1]`.

use crate::{Error, Rule1d};
use std::f64::consts::PI;

/// Newton iterations are capped; convergence from the initial guess takes a handful of steps.
const MAX_NEWTON_ITERATIONS: usize = 100;

/// Legendre polynomial `p_n` and its predecessor `p_{n-1}` evaluated at `x`.
///
/// The derivative formula is singular at |x| == 1, so it is only used in the open interval (-1, 1).
#[derive(Debug, Default)]
struct Legendre {
    n: usize,
    x: f64,
    p_n: f64,
    p_prev: f64,
}

impl Legendre {
    fn evaluate(n: usize, x: f64) -> Self {
        // Bonnet's recursion: m p_m = (2m - 1) x p_{m-1} - (m - 1) p_{m-2}
        let mut p_n = 1.0;
        let mut p_prev = 0.0;
        for m in 1..=n {
            let m = m as f64;
            let p_prev_prev = p_prev;
            p_prev = p_n;
            p_n = ((2.0 * m - 1.0) * x * p_prev - (m - 1.0) * p_prev_prev) / m;
        }
        Self { n, x, p_n, p_prev }
    }

    fn value(&self) -> f64 {
        self.p_n
    }

    fn derivative(&self) -> f64 {
        let n = self.n as f64;
        n * (self.x * self.p_n - self.p_prev) / (self.x * self.x - 1.0)
    }
}

/// Gauss rule on `[-1, 1]` with the given number of points.
///
/// A rule with `n` points integrates polynomials of degree up to `2n - 1` exactly.
/// Points are returned in increasing order.
pub fn try_gauss(num_points: usize) -> Result<Rule1d, Error> {
    let n = num_points;
    if n == 0 {
        return Err(Error::EmptyRule);
    }

    let mut roots = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    // Roots are symmetric about the origin, so only the positive half is computed
    let half = (n + 1) / 2;
    for i in 0..half {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut legendre = Legendre::evaluate(n, x);
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let dx = -legendre.value() / legendre.derivative();
            x += dx;
            legendre = Legendre::evaluate(n, x);
            if dx.abs() <= 1e-15 {
                break;
            }
        }
        let dp = legendre.derivative();
        roots.push(x);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }

    // Assemble in increasing order: mirrored negative roots first
    let mut points = Vec::with_capacity(n);
    let mut ordered_weights = Vec::with_capacity(n);
    for i in 0..n - half {
        points.push([-roots[i]]);
        ordered_weights.push(weights[i]);
    }
    for i in (0..half).rev() {
        points.push([roots[i]]);
        ordered_weights.push(weights[i]);
    }
    debug_assert_eq!(points.len(), n);

    Ok((ordered_weights, points))
}

/// Gauss rule on `[-1, 1]` with the given number of points.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss(num_points: usize) -> Rule1d {
    try_gauss(num_points).expect("number of points must be positive")
}
