//! Shared helpers for tests and benchmarks.
use nalgebra::{Matrix2, Point2, Vector2};

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = $x - $y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

/// A bivariate polynomial `sum_k c_k x^{p_k} y^{q_k}` used as a manufactured field.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial2d {
    terms: Vec<(f64, usize, usize)>,
}

impl Polynomial2d {
    /// Creates a polynomial from `(coefficient, p, q)` terms.
    pub fn from_terms(terms: impl IntoIterator<Item = (f64, usize, usize)>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    pub fn degree(&self) -> usize {
        self.terms
            .iter()
            .map(|&(_, p, q)| p + q)
            .max()
            .unwrap_or(0)
    }

    pub fn evaluate(&self, x: &Point2<f64>) -> f64 {
        self.derivative(0, 0, x)
    }

    /// Evaluates the mixed partial derivative of order `(a, b)` at `x`.
    pub fn derivative(&self, a: usize, b: usize, x: &Point2<f64>) -> f64 {
        self.terms
            .iter()
            .filter(|&&(_, p, q)| p >= a && q >= b)
            .map(|&(c, p, q)| c * falling_factorial(p, a) * falling_factorial(q, b) * monomial(x, p - a, q - b))
            .sum()
    }

    /// The polynomial `g(x) = f(rotation^T x)`, i.e. `f` rigidly rotated by `rotation`.
    ///
    /// Expansion is carried out exactly on the terms, so the result is again a polynomial of the
    /// same degree.
    pub fn rotated(&self, rotation: &Matrix2<f64>) -> Self {
        // x_old = R^T x_new, so x_old = r00 x + r10 y and y_old = r01 x + r11 y
        let x_old = [(rotation[(0, 0)], 1, 0), (rotation[(1, 0)], 0, 1)];
        let y_old = [(rotation[(0, 1)], 1, 0), (rotation[(1, 1)], 0, 1)];

        let mut result: Vec<(f64, usize, usize)> = Vec::new();
        for &(c, p, q) in &self.terms {
            let mut expansion = vec![(c, 0usize, 0usize)];
            for _ in 0..p {
                expansion = multiply_terms(&expansion, &x_old);
            }
            for _ in 0..q {
                expansion = multiply_terms(&expansion, &y_old);
            }
            result.extend(expansion);
        }
        Self { terms: result }
    }
}

fn multiply_terms(lhs: &[(f64, usize, usize)], rhs: &[(f64, usize, usize)]) -> Vec<(f64, usize, usize)> {
    let mut product = Vec::with_capacity(lhs.len() * rhs.len());
    for &(a, p1, q1) in lhs {
        for &(b, p2, q2) in rhs {
            product.push((a * b, p1 + p2, q1 + q2));
        }
    }
    product
}

fn monomial(x: &Point2<f64>, p: usize, q: usize) -> f64 {
    x.x.powi(p as i32) * x.y.powi(q as i32)
}

fn falling_factorial(n: usize, k: usize) -> f64 {
    (0..k).map(|i| (n - i) as f64).product()
}

/// Counter-clockwise rotation matrix for the angle `theta`.
pub fn rotation_matrix(theta: f64) -> Matrix2<f64> {
    let (s, c) = theta.sin_cos();
    Matrix2::new(c, -s, s, c)
}

pub fn rotate_point(rotation: &Matrix2<f64>, x: &Point2<f64>) -> Point2<f64> {
    Point2::from(rotation * x.coords)
}

pub fn rotate_vector(rotation: &Matrix2<f64>, v: &Vector2<f64>) -> Vector2<f64> {
    rotation * v
}
