//! Proptest strategies for face interpolation data.
use crate::taylor::{basis_count, Differential};
use ::proptest::prelude::*;
use nalgebra::{Point2, Vector2};
use std::f64::consts::PI;

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Keep coordinates moderate, since Taylor bases are evaluated with powers of them
    let range = -10.0..10.0;
    [range.clone(), range].prop_map(|[x, y]| Point2::new(x, y))
}

/// An angle in `[0, 2 pi)`.
pub fn angle() -> impl Strategy<Value = f64> {
    0.0..2.0 * PI
}

/// A unit vector with uniformly distributed angle.
pub fn unit_vector2() -> impl Strategy<Value = Vector2<f64>> {
    angle().prop_map(|theta| Vector2::new(theta.cos(), theta.sin()))
}

/// A differential of total order at most `max_order`.
pub fn differential(max_order: usize) -> impl Strategy<Value = Differential> {
    (0..basis_count(max_order)).prop_map(Differential)
}
