//! Elements and faces of a two-dimensional mesh, as seen by face interpolation.
//!
//! Only geometry and quadrature are stored here. Element coefficients are owned by the caller
//! and combined with the face operators through [`FaceOperators::apply`].
use crate::condition::BoundaryConditionCatalog;
use crate::config::SolverConfig;
use crate::error::FaceInterpolationError;
use crate::operators::FaceOperators;
use crate::quadrature::{Quadrature, QuadratureError, QuadratureRule};
use crate::workspace::{FaceInterpolationWorkspace, MAX_BORDERS};
use crate::Real;
use nalgebra::{Point2, Vector2};

pub mod procedural;

/// An element carrying a Taylor polynomial basis about its centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Element<T: Real> {
    pub centre: Point2<T>,
    /// Characteristic size, used as the scale of the Taylor basis.
    pub size: T,
    pub quadrature: QuadratureRule<T>,
}

impl<T: Real> Element<T> {
    pub fn new(centre: Point2<T>, size: T, quadrature: QuadratureRule<T>) -> Self {
        Self {
            centre,
            size,
            quadrature,
        }
    }

    /// Axis-aligned rectangular element with a tensor Gauss rule.
    ///
    /// The size of the element is the larger of its width and height.
    pub fn from_rectangle(
        min: &Point2<T>,
        max: &Point2<T>,
        num_points_per_dim: usize,
    ) -> Result<Self, QuadratureError> {
        let quadrature = QuadratureRule::rectangle_gauss(min, max, num_points_per_dim)?;
        let extents = max - min;
        Ok(Self {
            centre: nalgebra::center(min, max),
            size: extents.x.abs().max(extents.y.abs()),
            quadrature,
        })
    }
}

/// A face shared by one (boundary) or two (interior) elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Face<T: Real> {
    normal: Vector2<T>,
    centre: Point2<T>,
    size: T,
    quadrature: QuadratureRule<T>,
    borders: Vec<usize>,
    boundary_tag: Option<usize>,
    operators: Option<FaceOperators<T>>,
}

impl<T: Real> Face<T> {
    /// Creates a face from its unit normal, centre, size, quadrature and bordering elements.
    ///
    /// For boundary faces the normal should point out of the domain, since boundary constraints
    /// are expressed in the face-aligned frame. Normals whose length differs from one by more
    /// than the square root of machine epsilon are rejected.
    pub fn new(
        normal: Vector2<T>,
        centre: Point2<T>,
        size: T,
        quadrature: QuadratureRule<T>,
        borders: Vec<usize>,
    ) -> Result<Self, FaceInterpolationError> {
        if borders.is_empty() || borders.len() > MAX_BORDERS {
            return Err(FaceInterpolationError::InvalidConfiguration(format!(
                "a face must border 1 to {MAX_BORDERS} elements, got {}",
                borders.len()
            )));
        }
        if !(size > T::zero()) {
            return Err(FaceInterpolationError::InvalidConfiguration(
                "face size must be positive".to_string(),
            ));
        }
        let length = normal.norm();
        if !((length - T::one()).abs() <= T::default_epsilon().sqrt()) {
            return Err(FaceInterpolationError::InvalidConfiguration(format!(
                "face normal must have unit length, got length {length:?}"
            )));
        }
        Ok(Self {
            normal,
            centre,
            size,
            quadrature,
            borders,
            boundary_tag: None,
            operators: None,
        })
    }

    /// Straight face from `a` to `b` with a Gauss rule.
    ///
    /// The normal is the direction of `b - a` rotated clockwise, which points out of the domain
    /// when the boundary is traversed counter-clockwise.
    pub fn from_segment(
        a: &Point2<T>,
        b: &Point2<T>,
        num_points: usize,
        borders: Vec<usize>,
    ) -> Result<Self, FaceInterpolationError> {
        let tangent = b - a;
        let length = tangent.norm();
        let quadrature = QuadratureRule::segment_gauss(a, b, num_points)
            .map_err(|err| FaceInterpolationError::InvalidConfiguration(err.to_string()))?;
        let normal = Vector2::new(tangent.y, -tangent.x) / length;
        Self::new(normal, nalgebra::center(a, b), length, quadrature, borders)
    }

    /// Marks the face as a boundary face governed by the condition with the given catalog index.
    pub fn with_boundary_tag(mut self, tag: usize) -> Self {
        self.boundary_tag = Some(tag);
        self
    }

    pub fn normal(&self) -> &Vector2<T> {
        &self.normal
    }

    pub fn centre(&self) -> &Point2<T> {
        &self.centre
    }

    pub fn size(&self) -> T {
        self.size
    }

    pub fn quadrature(&self) -> &QuadratureRule<T> {
        &self.quadrature
    }

    pub fn n_quadrature(&self) -> usize {
        self.quadrature.len()
    }

    pub fn borders(&self) -> &[usize] {
        &self.borders
    }

    pub fn n_borders(&self) -> usize {
        self.borders.len()
    }

    pub fn boundary_tag(&self) -> Option<usize> {
        self.boundary_tag
    }

    pub fn is_boundary(&self) -> bool {
        self.boundary_tag.is_some()
    }

    /// The most recently computed operators, if the last computation succeeded.
    pub fn operators(&self) -> Option<&FaceOperators<T>> {
        self.operators.as_ref()
    }

    /// Recomputes the interpolation operators of this face.
    ///
    /// Previous operators are discarded before the computation starts, so a failed computation
    /// leaves the face without operators.
    pub fn update_operators(
        &mut self,
        workspace: &mut FaceInterpolationWorkspace<T>,
        elements: &[Element<T>],
        config: &SolverConfig,
        catalog: &BoundaryConditionCatalog,
    ) -> Result<(), FaceInterpolationError> {
        self.operators = None;
        let operators = workspace.compute_face_operators(self, elements, config, catalog)?;
        self.operators = Some(operators);
        Ok(())
    }
}

/// Elements and faces of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMesh<T: Real> {
    pub elements: Vec<Element<T>>,
    pub faces: Vec<Face<T>>,
}

impl<T: Real> FaceMesh<T> {
    pub fn new(elements: Vec<Element<T>>, faces: Vec<Face<T>>) -> Self {
        Self { elements, faces }
    }

    /// Splits the mesh so that faces can be updated while elements are read.
    pub fn elements_and_faces_mut(&mut self) -> (&[Element<T>], &mut [Face<T>]) {
        (&self.elements, &mut self.faces)
    }
}
