//! Basic procedural mesh generation routines.
use crate::error::FaceInterpolationError;
use crate::mesh::{Element, Face, FaceMesh};
use crate::Real;
use nalgebra::{convert, Point2};

/// Options for [`create_rectangular_strip`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StripOptions {
    /// Gauss points per dimension in each element.
    pub element_points_per_dim: usize,
    /// Gauss points on each face.
    pub face_points: usize,
    /// Boundary tag of the faces on the boundary of the strip.
    ///
    /// If `None`, no boundary faces are generated.
    pub boundary_tag: Option<usize>,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            element_points_per_dim: 2,
            face_points: 2,
            boundary_tag: None,
        }
    }
}

/// Generates a structured grid of `cells_x x cells_y` square elements with the given cell size,
/// whose lower-left corner is at `origin`.
///
/// Element `(i, j)` has index `j * cells_x + i`. Interior faces have normals pointing in the
/// positive `x` or `y` direction and border the element behind the face first. Boundary faces
/// have outward normals and border a single element. Interior faces are listed before boundary
/// faces.
pub fn create_rectangular_strip<T: Real>(
    origin: &Point2<T>,
    cell_size: T,
    cells_x: usize,
    cells_y: usize,
    options: &StripOptions,
) -> Result<FaceMesh<T>, FaceInterpolationError> {
    if cells_x == 0 || cells_y == 0 {
        return Ok(FaceMesh::new(Vec::new(), Vec::new()));
    }

    let vertex = |i: usize, j: usize| -> Point2<T> {
        let i: T = convert(i as f64);
        let j: T = convert(j as f64);
        Point2::new(origin.x + i * cell_size, origin.y + j * cell_size)
    };
    let element_index = |i: usize, j: usize| j * cells_x + i;
    let invalid_quadrature = |err: crate::quadrature::QuadratureError| {
        FaceInterpolationError::InvalidConfiguration(format!("invalid element quadrature: {err}"))
    };

    let mut elements = Vec::with_capacity(cells_x * cells_y);
    for j in 0..cells_y {
        for i in 0..cells_x {
            let element = Element::from_rectangle(&vertex(i, j), &vertex(i + 1, j + 1), options.element_points_per_dim)
                .map_err(invalid_quadrature)?;
            elements.push(element);
        }
    }

    let n = options.face_points;
    let mut faces = Vec::new();
    // Vertical interior faces, normal +x
    for j in 0..cells_y {
        for i in 1..cells_x {
            let borders = vec![element_index(i - 1, j), element_index(i, j)];
            faces.push(Face::from_segment(&vertex(i, j), &vertex(i, j + 1), n, borders)?);
        }
    }
    // Horizontal interior faces, normal +y
    for j in 1..cells_y {
        for i in 0..cells_x {
            let borders = vec![element_index(i, j - 1), element_index(i, j)];
            faces.push(Face::from_segment(&vertex(i + 1, j), &vertex(i, j), n, borders)?);
        }
    }

    if let Some(tag) = options.boundary_tag {
        // Segments run counter-clockwise around the domain, so that normals point outwards
        let mut boundary = Vec::new();
        for i in 0..cells_x {
            boundary.push((vertex(i, 0), vertex(i + 1, 0), element_index(i, 0)));
            boundary.push((
                vertex(i + 1, cells_y),
                vertex(i, cells_y),
                element_index(i, cells_y - 1),
            ));
        }
        for j in 0..cells_y {
            boundary.push((vertex(0, j + 1), vertex(0, j), element_index(0, j)));
            boundary.push((
                vertex(cells_x, j),
                vertex(cells_x, j + 1),
                element_index(cells_x - 1, j),
            ));
        }
        for (a, b, element) in boundary {
            faces.push(Face::from_segment(&a, &b, n, vec![element])?.with_boundary_tag(tag));
        }
    }

    Ok(FaceMesh::new(elements, faces))
}
