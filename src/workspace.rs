//! Scratch workspace for face interpolation.
//!
//! All dense buffers needed to build the operators of a face are allocated once, sized to the
//! worst case over all variables and boundary conditions, and then reused for every face.
//! A workspace is not shared between threads; parallel drivers create one workspace per worker.
use crate::condition::BoundaryConditionCatalog;
use crate::config::SolverConfig;
use crate::error::FaceInterpolationError;
use crate::frame::FaceFrame;
use crate::Real;
use log::debug;
use nalgebra::{DMatrix, Point2};

/// Maximum number of elements bordering a face.
pub const MAX_BORDERS: usize = 2;

/// Allocates a zero-filled vector, reporting allocation failure instead of aborting.
pub(crate) fn try_filled_vec<T: Clone>(len: usize, value: T, buffer: &'static str) -> Result<Vec<T>, FaceInterpolationError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(FaceInterpolationError::memory(buffer, len))?;
    data.resize(len, value);
    Ok(data)
}

/// Allocates an empty vector able to hold `capacity` entries without reallocating.
pub(crate) fn try_with_capacity<T>(capacity: usize, buffer: &'static str) -> Result<Vec<T>, FaceInterpolationError> {
    let mut data = Vec::new();
    data.try_reserve_exact(capacity)
        .map_err(FaceInterpolationError::memory(buffer, capacity))?;
    Ok(data)
}

/// Allocates a zero matrix, reporting allocation failure instead of aborting.
pub(crate) fn try_zeros<T: Real>(
    nrows: usize,
    ncols: usize,
    buffer: &'static str,
) -> Result<DMatrix<T>, FaceInterpolationError> {
    let len = nrows
        .checked_mul(ncols)
        .ok_or(FaceInterpolationError::Memory { buffer, len: usize::MAX })?;
    let data = try_filled_vec(len, T::zero(), buffer)?;
    Ok(DMatrix::from_vec(nrows, ncols, data))
}

/// Worst-case problem dimensions a workspace is sized for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WorkspaceDimensions {
    pub max_order: usize,
    pub max_basis_count: usize,
    pub max_constraints: usize,
    pub max_face_quadrature: usize,
    pub max_element_quadrature: usize,
}

impl WorkspaceDimensions {
    pub fn from_config(config: &SolverConfig, catalog: &BoundaryConditionCatalog) -> Self {
        Self {
            max_order: config.max_order(),
            max_basis_count: config.max_basis_count(),
            max_constraints: catalog.max_n_constraints(),
            max_face_quadrature: config.max_face_quadrature,
            max_element_quadrature: config.max_element_quadrature,
        }
    }

    /// Largest number of element basis functions coupled through a face.
    pub fn max_adjacent_bases(&self) -> usize {
        MAX_BORDERS.saturating_mul(self.max_basis_count)
    }

    /// Largest size of a face-local candidate basis, i.e. of a weak interpolation system.
    pub fn max_interpolation_bases(&self) -> usize {
        self.max_adjacent_bases()
            .saturating_add(self.max_constraints.saturating_mul(self.max_face_quadrature))
    }

    /// Largest number of element quadrature points over all borders of a face.
    pub fn max_border_points(&self) -> usize {
        MAX_BORDERS.saturating_mul(self.max_element_quadrature)
    }
}

/// Reusable buffers for computing face interpolation operators.
///
/// Create one with [`FaceInterpolationWorkspace::try_new`] and pass it to
/// [`compute_face_operators`](FaceInterpolationWorkspace::compute_face_operators) for every face.
/// Dropping the workspace releases all memory.
#[derive(Debug)]
pub struct FaceInterpolationWorkspace<T: Real> {
    pub(crate) dimensions: WorkspaceDimensions,

    // Geometry in the face-aligned frame
    pub(crate) frame: FaceFrame<T>,
    pub(crate) face_points: Vec<Point2<T>>,
    pub(crate) border_points: [Vec<Point2<T>>; MAX_BORDERS],

    // Problem sizes per variable
    pub(crate) n_adj_bases: Vec<usize>,
    pub(crate) n_int_bases: Vec<usize>,

    // Taylor indices of the face-local candidate basis
    pub(crate) face_basis: Vec<usize>,

    // Element basis values (P), weighted element basis values (S) and candidate basis values (Q)
    // at the element quadrature points of all borders
    pub(crate) p: DMatrix<T>,
    pub(crate) s: DMatrix<T>,
    pub(crate) q: DMatrix<T>,

    // Weak interpolation system A X = B, solved in place in B
    pub(crate) a: DMatrix<T>,
    pub(crate) b: DMatrix<T>,

    // Differentiated candidate basis at the face points (F), and the rotated-frame derivative
    // operators D_i = F_i X, one per element basis function
    pub(crate) f: DMatrix<T>,
    pub(crate) d: Vec<DMatrix<T>>,
}

impl<T: Real> FaceInterpolationWorkspace<T> {
    /// Allocates a workspace sized for the given configuration and boundary conditions.
    ///
    /// Returns [`FaceInterpolationError::Memory`] if any buffer cannot be allocated, and a
    /// configuration error if the configuration or catalog is invalid.
    pub fn try_new(config: &SolverConfig, catalog: &BoundaryConditionCatalog) -> Result<Self, FaceInterpolationError> {
        config.validate()?;
        catalog.validate(config)?;
        Self::try_with_dimensions(config.n_variables(), WorkspaceDimensions::from_config(config, catalog))
    }

    /// Allocates a workspace for `n_variables` variables and the given worst-case dimensions.
    pub fn try_with_dimensions(
        n_variables: usize,
        dimensions: WorkspaceDimensions,
    ) -> Result<Self, FaceInterpolationError> {
        let max_adj = dimensions.max_adjacent_bases();
        let max_int = dimensions.max_interpolation_bases();
        let max_points = dimensions.max_border_points();
        let max_face_points = dimensions.max_face_quadrature;
        debug!(
            "Allocating face interpolation workspace: {} variables, up to {} adjacent bases, \
             {} interpolation bases, {} element points and {} face points",
            n_variables, max_adj, max_int, max_points, max_face_points
        );

        let face_points = try_with_capacity(max_face_points, "face_points")?;
        let border_points = [
            try_with_capacity(dimensions.max_element_quadrature, "border_points")?,
            try_with_capacity(dimensions.max_element_quadrature, "border_points")?,
        ];
        let frame = FaceFrame::try_new(dimensions.max_order)?;

        let n_adj_bases = try_filled_vec(n_variables, 0, "n_adj_bases")?;
        let n_int_bases = try_filled_vec(n_variables, 0, "n_int_bases")?;
        let face_basis = try_with_capacity(max_int, "face_basis")?;

        let p = try_zeros(max_points, max_adj, "P")?;
        let s = try_zeros(max_points, max_adj, "S")?;
        let q = try_zeros(max_points, max_int, "Q")?;
        let a = try_zeros(max_int, max_int, "A")?;
        let b = try_zeros(max_int, max_int, "B")?;
        let f = try_zeros(max_face_points, max_int, "F")?;

        let mut d = try_with_capacity(dimensions.max_basis_count, "D")?;
        for _ in 0..dimensions.max_basis_count {
            d.push(try_zeros(max_face_points, max_int, "D")?);
        }

        Ok(Self {
            dimensions,
            frame,
            face_points,
            border_points,
            n_adj_bases,
            n_int_bases,
            face_basis,
            p,
            s,
            q,
            a,
            b,
            f,
            d,
        })
    }

    pub fn dimensions(&self) -> &WorkspaceDimensions {
        &self.dimensions
    }

    /// Number of adjacent element bases of each variable for the most recently processed face.
    pub fn n_adj_bases(&self) -> &[usize] {
        &self.n_adj_bases
    }

    /// Size of the interpolation system of each variable for the most recently processed face.
    pub fn n_int_bases(&self) -> &[usize] {
        &self.n_int_bases
    }
}

/// Fails with [`FaceInterpolationError::WorkspaceTooSmall`] if `required` exceeds `capacity`.
pub(crate) fn ensure_capacity(what: &'static str, required: usize, capacity: usize) -> Result<(), FaceInterpolationError> {
    if required > capacity {
        Err(FaceInterpolationError::WorkspaceTooSmall {
            what,
            required,
            capacity,
        })
    } else {
        Ok(())
    }
}
