//! Face-aligned coordinate frames.
//!
//! A face frame rotates the plane so that the first axis is aligned with the face normal and the
//! second axis is tangential to the face. Interpolants are built in this frame, and derivatives
//! computed in it are converted back to Cartesian derivatives by the transformation matrix.
use crate::error::FaceInterpolationError;
use crate::taylor::{basis_count, taylor_index, taylor_powers};
use crate::workspace::try_zeros;
use crate::Real;
use nalgebra::{DMatrix, Matrix2, Point2, Vector2};
use num::integer::binomial;

/// Rotation $R = \begin{pmatrix} n_x & n_y \\\\ -n_y & n_x \end{pmatrix}$ mapping Cartesian
/// directions to the face-aligned frame.
pub fn rotation_from_normal<T: Real>(normal: &Vector2<T>) -> Matrix2<T> {
    Matrix2::new(normal.x, normal.y, -normal.y, normal.x)
}

/// Inverse of a 2x2 matrix computed from its determinant.
///
/// Returns `None` if the matrix is (numerically) singular.
pub fn try_invert_2x2<T: Real>(matrix: &Matrix2<T>) -> Option<Matrix2<T>> {
    let det = matrix.determinant();
    if det.abs() <= T::default_epsilon() {
        return None;
    }
    Some(Matrix2::new(
        matrix[(1, 1)] / det,
        -matrix[(0, 1)] / det,
        -matrix[(1, 0)] / det,
        matrix[(0, 0)] / det,
    ))
}

/// Fills the transformation matrix from derivatives in a rotated frame to Cartesian derivatives.
///
/// Given the matrix $M$ with $\partial_{x_j} = \sum_i M_{ji} \partial_{y_i}$, entry
/// `(d, i)` of the output holds the coefficient of the rotated derivative with Taylor index `i`
/// in the Cartesian derivative with Taylor index `d`. For $d = (a, b)$ this is the expansion
/// of $(M_{00} \partial_{y_0} + M_{01} \partial_{y_1})^a (M_{10} \partial_{y_0} + M_{11} \partial_{y_1})^b$.
/// The matrix is block diagonal with one block per total order.
///
/// # Panics
///
/// Panics if the output is not square with at least [`basis_count(max_order)`](basis_count) rows.
pub fn populate_transformation_matrix<T: Real>(max_order: usize, m: &Matrix2<T>, output: &mut DMatrix<T>) {
    let n_bases = basis_count(max_order);
    assert!(output.is_square(), "Transformation matrix must be square");
    assert!(output.nrows() >= n_bases, "Transformation matrix is too small");
    output.fill(T::zero());

    for d in 0..n_bases {
        let (a, b) = taylor_powers(d);
        let n = a + b;
        for i in 0..=a {
            // Term C(a, i) m00^(a - i) m01^i d0^(a - i) d1^i from the first factor
            let first = binomial_coefficient::<T>(a, i) * m[(0, 0)].powi((a - i) as i32) * m[(0, 1)].powi(i as i32);
            for j in 0..=b {
                let second =
                    binomial_coefficient::<T>(b, j) * m[(1, 0)].powi((b - j) as i32) * m[(1, 1)].powi(j as i32);
                let q = i + j;
                output[(d, taylor_index(n - q, q))] += first * second;
            }
        }
    }
}

fn binomial_coefficient<T: Real>(n: usize, k: usize) -> T {
    nalgebra::convert(binomial(n, k) as f64)
}

/// Rotation, inverse rotation and derivative transformation of a single face.
#[derive(Debug, Clone)]
pub struct FaceFrame<T: Real> {
    max_order: usize,
    rotation: Matrix2<T>,
    inverse_rotation: Matrix2<T>,
    transformation: DMatrix<T>,
}

impl<T: Real> FaceFrame<T> {
    /// Allocates a frame able to transform derivatives up to the given order.
    pub fn try_new(max_order: usize) -> Result<Self, FaceInterpolationError> {
        let n_bases = basis_count(max_order);
        let mut transformation = try_zeros(n_bases, n_bases, "transformation")?;
        populate_transformation_matrix(max_order, &Matrix2::identity(), &mut transformation);
        Ok(Self {
            max_order,
            rotation: Matrix2::identity(),
            inverse_rotation: Matrix2::identity(),
            transformation,
        })
    }

    /// Rebuilds the frame for the given face normal.
    ///
    /// The normal is expected to have unit length, in which case the inverse rotation is the
    /// transpose of the rotation.
    pub fn update(&mut self, normal: &Vector2<T>) -> Result<(), FaceInterpolationError> {
        let rotation = rotation_from_normal(normal);
        let inverse_rotation = try_invert_2x2(&rotation).ok_or(FaceInterpolationError::DegenerateNormal)?;
        self.rotation = rotation;
        self.inverse_rotation = inverse_rotation;
        populate_transformation_matrix(self.max_order, &self.inverse_rotation, &mut self.transformation);
        Ok(())
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    pub fn rotation(&self) -> &Matrix2<T> {
        &self.rotation
    }

    pub fn inverse_rotation(&self) -> &Matrix2<T> {
        &self.inverse_rotation
    }

    pub fn transformation(&self) -> &DMatrix<T> {
        &self.transformation
    }

    /// Rotates `x` about `centre` into the face-aligned frame: $c + R (x - c)$.
    pub fn to_face_coordinates(&self, centre: &Point2<T>, x: &Point2<T>) -> Point2<T> {
        centre + self.rotation * (x - centre)
    }
}
