//! Scaled Taylor monomial bases in two dimensions.
//!
//! Monomials are indexed by total order and, within one order, by increasing power of the second
//! coordinate:
//!
//! | index | 0 | 1 | 2 | 3 | 4 | 5 | ... |
//! |-------|---|---|---|---|---|---|-----|
//! | (p, q) | (0, 0) | (1, 0) | (0, 1) | (2, 0) | (1, 1) | (0, 2) | ... |
//!
//! The basis function with index `(p, q)`, centre $c$ and scale $h$ is
//! <div>$$
//!   \phi_{pq}(x) = \frac{1}{p! \\, q!} \left(\frac{x_1 - c_1}{h}\right)^p \left(\frac{x_2 - c_2}{h}\right)^q.
//! $$</div>
//! With this normalization, the coefficient of $\phi_{pq}$ in the Taylor expansion of a
//! function $f$ about $c$ is $h^{p + q} \\, \partial^p_1 \partial^q_2 f(c)$.
//!
//! The same indexing is used for differential operators, see [`Differential`].
use crate::Real;
use nalgebra::storage::StorageMut;
use nalgebra::{convert, Dyn, Point2, Vector, U1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Number of Taylor monomials of total degree at most `order`.
pub fn basis_count(order: usize) -> usize {
    (order + 1) * (order + 2) / 2
}

/// Index of the monomial with powers `(p, q)`.
pub fn taylor_index(p: usize, q: usize) -> usize {
    let n = p + q;
    n * (n + 1) / 2 + q
}

/// Powers `(p, q)` of the monomial with the given index.
pub fn taylor_powers(index: usize) -> (usize, usize) {
    let mut n = 0;
    while basis_count(n) <= index {
        n += 1;
    }
    let q = index - n * (n + 1) / 2;
    (n - q, q)
}

/// A partial differential operator $\partial^a_1 \partial^b_2$, identified by its Taylor index.
///
/// Index 0 is the identity (the plain value), 1 is $\partial / \partial x$, 2 is
/// $\partial / \partial y$, 3 is $\partial^2 / \partial x^2$ and so on.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Differential(pub usize);

impl Differential {
    pub const VALUE: Self = Self(0);
    pub const DX: Self = Self(1);
    pub const DY: Self = Self(2);

    pub fn from_powers(a: usize, b: usize) -> Self {
        Self(taylor_index(a, b))
    }

    pub fn powers(&self) -> (usize, usize) {
        taylor_powers(self.0)
    }

    /// Total order of the differential.
    pub fn order(&self) -> usize {
        let (a, b) = self.powers();
        a + b
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for Differential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.powers() {
            (0, 0) => write!(f, "value"),
            (a, b) => {
                write!(f, "d")?;
                if a > 0 {
                    write!(f, "x^{a}")?;
                }
                if b > 0 {
                    write!(f, "y^{b}")?;
                }
                Ok(())
            }
        }
    }
}

fn factorial<T: Real>(n: usize) -> T {
    (2..=n).fold(T::one(), |acc, k| acc * convert(k as f64))
}

/// Evaluates the given derivative of the Taylor basis function `index` at `x`.
///
/// Derivatives are taken with respect to the physical coordinates, i.e. they include the factor
/// $h^{-(a + b)}$ from the scaling.
pub fn evaluate_basis<T: Real>(
    index: usize,
    differential: Differential,
    x: &Point2<T>,
    centre: &Point2<T>,
    scale: T,
) -> T {
    let (p, q) = taylor_powers(index);
    let (a, b) = differential.powers();
    if a > p || b > q {
        return T::zero();
    }

    let dx = (x.x - centre.x) / scale;
    let dy = (x.y - centre.y) / scale;
    let value = dx.powi((p - a) as i32) / factorial::<T>(p - a) * dy.powi((q - b) as i32) / factorial::<T>(q - b);
    value / scale.powi((a + b) as i32)
}

/// Evaluates one (differentiated) basis function at each of the given points.
///
/// # Panics
///
/// Panics if the output does not have the same length as `points`.
pub fn populate_basis_values<T, S>(
    output: &mut Vector<T, Dyn, S>,
    points: &[Point2<T>],
    centre: &Point2<T>,
    scale: T,
    index: usize,
    differential: Differential,
) where
    T: Real,
    S: StorageMut<T, Dyn, U1>,
{
    assert_eq!(output.len(), points.len(), "Output must hold one value per point");
    for (value, x) in output.iter_mut().zip(points) {
        *value = evaluate_basis(index, differential, x, centre, scale);
    }
}

/// Taylor coefficients of a function about `centre` with scale `h`.
///
/// `derivative(a, b)` must return $\partial^a_1 \partial^b_2 f(c)$. Returns the coefficients of
/// the first [`basis_count(order)`](basis_count) basis functions, so that a polynomial of degree at most
/// `order` is represented exactly.
pub fn taylor_coefficients<T: Real>(order: usize, scale: T, derivative: impl Fn(usize, usize) -> T) -> Vec<T> {
    (0..basis_count(order))
        .map(|index| {
            let (p, q) = taylor_powers(index);
            scale.powi((p + q) as i32) * derivative(p, q)
        })
        .collect()
}
