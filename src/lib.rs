//! Precomputed interpolation operators for the faces of a two-dimensional mesh.
//!
//! Each element carries a Taylor polynomial basis about its centre. For every face, this crate
//! computes dense operators that map the element coefficients of the bordering elements (and,
//! on boundary faces, prescribed constraint values) to values and Cartesian derivatives of a
//! face-local interpolant at the face quadrature points.
//!
//! The typical workflow is:
//!
//! 1. describe the variables and interpolation requests in a [`SolverConfig`](config::SolverConfig)
//!    and the boundary conditions in a [`BoundaryConditionCatalog`](condition::BoundaryConditionCatalog),
//! 2. allocate a [`FaceInterpolationWorkspace`](workspace::FaceInterpolationWorkspace),
//! 3. call [`Face::update_operators`](mesh::Face::update_operators) for every face, or use
//!    [`compute_all_face_operators`](interpolation::compute_all_face_operators) to process a whole
//!    mesh in parallel.
use nalgebra::RealField;

pub mod condition;
pub mod config;
pub mod error;
pub mod frame;
pub mod interpolation;
pub mod mesh;
pub mod operators;
pub mod quadrature;
pub mod taylor;
pub mod workspace;

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub extern crate nalgebra;

pub use error::{ErrorKind, FaceInterpolationError};

/// A real scalar type usable with face interpolation.
///
/// Used as a trait alias for the traits needed by generic routines in this crate.
pub trait Real: RealField + Copy {}

impl<T> Real for T where T: RealField + Copy {}
