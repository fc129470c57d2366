//! Construction of face interpolation operators.
//!
//! For every variable, the face interpolant is a polynomial in a face-aligned frame centred at
//! the face. Its coefficients are determined by a weak system: the interpolant is required to
//! match the element polynomial of each bordering element in a least-squares sense with respect
//! to the element quadrature, and on boundary faces to satisfy the constraints of the boundary
//! condition pointwise at the face quadrature points. Since everything is linear in the element
//! coefficients and constraint values, the map from these inputs to values and derivatives of
//! the interpolant at the face quadrature points is a dense matrix, which is what we compute.
use crate::condition::{BoundaryCondition, BoundaryConditionCatalog};
use crate::config::SolverConfig;
use crate::error::FaceInterpolationError;
use crate::mesh::{Element, Face, FaceMesh};
use crate::operators::FaceOperators;
use crate::quadrature::Quadrature;
use crate::taylor::{basis_count, populate_basis_values, taylor_index, Differential};
use crate::workspace::{ensure_capacity, FaceInterpolationWorkspace, WorkspaceDimensions};
use crate::Real;
use eyre::WrapErr;
use log::{debug, error, trace};
use nalgebra::{convert, DMatrix, DVector, DimName, Dyn, Point2, U1};
use numeric_literals::replace_float_literals;
use rayon::prelude::*;

/// Enumerates the Taylor indices of the face-local candidate basis.
///
/// The candidates are the monomials $y_1^p y_2^q$ with $p + n_b q < n_b (k + 1) + n_c$ and
/// $q <$ `n_quadrature`, where $n_b$ is the number of bordering elements, $k$ the polynomial
/// order of the variable and $n_c$ its number of boundary constraints. Higher tangential powers
/// cannot be distinguished at the face quadrature points. Monomials are visited by increasing
/// weighted level $p + n_b q$, and within one level by decreasing tangential power $q$.
///
/// Returns the number of enumerated indices. The weak system is only well-posed when this
/// equals $n_b \binom{k + 2}{2} + n_c$ `n_quadrature`, which holds for interior faces with at
/// least $k + 1$ quadrature points.
pub fn enumerate_face_basis(
    n_borders: usize,
    n_quadrature: usize,
    order: usize,
    n_constraints: usize,
    output: &mut Vec<usize>,
) -> usize {
    output.clear();
    if n_borders == 0 || n_quadrature == 0 {
        return 0;
    }

    let bound = n_borders * (order + 1) + n_constraints;
    for level in 0..bound {
        let max_q = (level / n_borders).min(n_quadrature - 1);
        for q in (0..=max_q).rev() {
            let p = level - n_borders * q;
            output.push(taylor_index(p, q));
        }
    }
    output.len()
}

/// Writes one (differentiated) basis function at the given points into part of a matrix column.
#[allow(clippy::too_many_arguments)]
fn populate_column<T: Real>(
    matrix: &mut DMatrix<T>,
    row: usize,
    col: usize,
    points: &[Point2<T>],
    centre: &Point2<T>,
    scale: T,
    index: usize,
    differential: Differential,
) {
    let mut column = matrix.generic_view_mut((row, col), (Dyn(points.len()), U1::name()));
    populate_basis_values(&mut column, points, centre, scale, index, differential);
}

/// Checks that no pivot of an LU factorization is negligible compared to the largest one.
///
/// Pivots below $n \varepsilon \max_i |u_{ii}|$ are indistinguishable from rounding errors,
/// in which case the system is rank deficient and its solution meaningless.
fn has_regular_pivots<T: Real>(pivots: &DVector<T>) -> bool {
    let n = pivots.len();
    let max_pivot = pivots.iter().fold(T::zero(), |max, pivot| max.max(pivot.abs()));
    let tolerance = max_pivot * T::default_epsilon() * convert::<f64, T>(n as f64);
    pivots.iter().all(|pivot| pivot.abs() > tolerance)
}

impl<T: Real> FaceInterpolationWorkspace<T> {
    /// Computes the interpolation operators of a face, one per interpolation request.
    ///
    /// Operator `r` maps the coefficients of the requested variable in the bordering elements
    /// (in the order of [`Face::borders`]), followed by the values of each boundary constraint at
    /// each face quadrature point, to the requested value or Cartesian derivative at the face
    /// quadrature points.
    ///
    /// Apart from the returned operators, no memory is allocated beyond one copy of the weak
    /// system per variable for the LU factorization.
    pub fn compute_face_operators(
        &mut self,
        face: &Face<T>,
        elements: &[Element<T>],
        config: &SolverConfig,
        catalog: &BoundaryConditionCatalog,
    ) -> Result<FaceOperators<T>, FaceInterpolationError> {
        self.compute_face_operators_impl(face, elements, config, catalog)
            .map_err(|err| {
                error!("Face interpolation failed: {err}");
                err
            })
    }

    fn compute_face_operators_impl(
        &mut self,
        face: &Face<T>,
        elements: &[Element<T>],
        config: &SolverConfig,
        catalog: &BoundaryConditionCatalog,
    ) -> Result<FaceOperators<T>, FaceInterpolationError> {
        config.validate()?;
        let condition = match face.boundary_tag() {
            Some(tag) => Some(catalog.get(tag).ok_or_else(|| {
                FaceInterpolationError::InvalidConfiguration(format!(
                    "boundary tag {tag} is not in the condition catalog ({} conditions)",
                    catalog.conditions.len()
                ))
            })?),
            None => None,
        };

        self.check_face_dimensions(face, elements, config, condition)?;
        let n_quadrature = face.n_quadrature();
        let n_borders = face.n_borders();
        for (variable, var) in config.variables.iter().enumerate() {
            let n_constraints = condition.map_or(0, |condition| condition.n_constraints(variable));
            let n_adj = n_borders * var.basis_count();
            let n_int = n_adj + n_constraints * n_quadrature;
            ensure_capacity("interpolation bases", n_int, self.dimensions.max_interpolation_bases())?;
            self.n_adj_bases[variable] = n_adj;
            self.n_int_bases[variable] = n_int;
        }
        debug!(
            "Computing face operators: {} borders, {} quadrature points, boundary tag {:?}, \
             interpolation bases {:?}",
            n_borders,
            n_quadrature,
            face.boundary_tag(),
            self.n_int_bases
        );

        let mut operators = FaceOperators::try_zeros(
            n_quadrature,
            config
                .interpolations
                .iter()
                .map(|request| self.n_int_bases[request.variable]),
        )?;

        self.frame.update(face.normal())?;
        self.map_geometry(face, elements);

        for variable in 0..config.n_variables() {
            self.compute_variable_operators(variable, face, elements, config, condition, &mut operators)?;
        }

        Ok(operators)
    }

    fn check_face_dimensions(
        &self,
        face: &Face<T>,
        elements: &[Element<T>],
        config: &SolverConfig,
        condition: Option<&BoundaryCondition>,
    ) -> Result<(), FaceInterpolationError> {
        let dims = &self.dimensions;
        if config.n_variables() != self.n_adj_bases.len() {
            return Err(FaceInterpolationError::InvalidConfiguration(format!(
                "configuration has {} variables, but the workspace was created for {}",
                config.n_variables(),
                self.n_adj_bases.len()
            )));
        }
        ensure_capacity("variable order", config.max_order(), dims.max_order)?;
        ensure_capacity("face quadrature points", face.n_quadrature(), dims.max_face_quadrature)?;
        if let Some(condition) = condition {
            if condition.constraints.len() != config.n_variables() {
                return Err(FaceInterpolationError::InvalidConfiguration(format!(
                    "boundary condition `{}` has constraints for {} variables, expected {}",
                    condition.name,
                    condition.constraints.len(),
                    config.n_variables()
                )));
            }
        }

        for &border in face.borders() {
            let element = elements.get(border).ok_or_else(|| {
                FaceInterpolationError::InvalidConfiguration(format!(
                    "face borders element {border}, but there are only {} elements",
                    elements.len()
                ))
            })?;
            ensure_capacity(
                "element quadrature points",
                element.quadrature.len(),
                dims.max_element_quadrature,
            )?;
        }
        Ok(())
    }

    /// Rotates the face and element quadrature points into the face-aligned frame.
    fn map_geometry(&mut self, face: &Face<T>, elements: &[Element<T>]) {
        let centre = face.centre();
        let frame = &self.frame;

        self.face_points.clear();
        self.face_points.extend(
            face.quadrature()
                .points()
                .iter()
                .map(|x| frame.to_face_coordinates(centre, x)),
        );

        for (points, &border) in self.border_points.iter_mut().zip(face.borders()) {
            points.clear();
            points.extend(
                elements[border]
                    .quadrature
                    .points()
                    .iter()
                    .map(|x| frame.to_face_coordinates(centre, x)),
            );
        }
    }

    #[replace_float_literals(convert::<f64, T>(literal))]
    fn compute_variable_operators(
        &mut self,
        variable: usize,
        face: &Face<T>,
        elements: &[Element<T>],
        config: &SolverConfig,
        condition: Option<&BoundaryCondition>,
        operators: &mut FaceOperators<T>,
    ) -> Result<(), FaceInterpolationError> {
        let n_borders = face.n_borders();
        let n_quadrature = face.n_quadrature();
        let order = config.variables[variable].order;
        let n_bases = basis_count(order);
        let n_adj = self.n_adj_bases[variable];
        let n_int = self.n_int_bases[variable];
        let face_centre = face.centre();
        let face_scale = face.size() * 0.5;
        let constraints = condition.map_or(&[][..], |condition| condition.differentials(variable));

        let enumerated = enumerate_face_basis(
            n_borders,
            n_quadrature,
            order,
            constraints.len(),
            &mut self.face_basis,
        );
        if enumerated != n_int {
            return Err(FaceInterpolationError::BasisCountMismatch {
                variable,
                expected: n_int,
                enumerated,
            });
        }

        let n_points: usize = face
            .borders()
            .iter()
            .map(|&border| elements[border].quadrature.len())
            .sum();
        trace!(
            "Variable {variable}: {n_adj} adjacent bases, {n_int} interpolation bases, {n_points} element points"
        );

        // Element bases (P) and candidate bases (Q) at the element quadrature points of each border
        self.p.view_mut((0, 0), (n_points, n_adj)).fill(T::zero());
        let mut row = 0;
        for (b, &border) in face.borders().iter().enumerate() {
            let element = &elements[border];
            let element_points = element.quadrature.points();
            for j in 0..n_bases {
                populate_column(
                    &mut self.p,
                    row,
                    b * n_bases + j,
                    element_points,
                    &element.centre,
                    element.size,
                    j,
                    Differential::VALUE,
                );
            }
            for (j, &index) in self.face_basis.iter().enumerate() {
                populate_column(
                    &mut self.q,
                    row,
                    j,
                    &self.border_points[b],
                    face_centre,
                    face_scale,
                    index,
                    Differential::VALUE,
                );
            }

            // S is P weighted by the element quadrature
            for (i, &weight) in element.quadrature.weights().iter().enumerate() {
                let r = row + i;
                self.s
                    .view_mut((r, 0), (1, n_adj))
                    .zip_apply(&self.p.view((r, 0), (1, n_adj)), |s, p| *s = p * weight);
            }
            row += element_points.len();
        }

        // Weak system A X = B
        self.a.view_mut((0, 0), (n_int, n_int)).fill(T::zero());
        self.b.view_mut((0, 0), (n_int, n_int)).fill(T::zero());
        {
            let s = self.s.view((0, 0), (n_points, n_adj));
            self.a
                .view_mut((0, 0), (n_adj, n_int))
                .gemm_tr(T::one(), &s, &self.q.view((0, 0), (n_points, n_int)), T::zero());
            self.b
                .view_mut((0, 0), (n_adj, n_adj))
                .gemm_tr(T::one(), &s, &self.p.view((0, 0), (n_points, n_adj)), T::zero());
        }

        // Constraint c pins its differential at every face quadrature point in its own block of rows
        for (c, &differential) in constraints.iter().enumerate() {
            let row = n_adj + c * n_quadrature;
            for (j, &index) in self.face_basis.iter().enumerate() {
                let mut column = self.a.generic_view_mut((row, j), (Dyn(n_quadrature), U1::name()));
                populate_basis_values(&mut column, &self.face_points, face_centre, face_scale, index, differential);
            }
            for k in row..row + n_quadrature {
                self.b[(k, k)] = T::one();
            }
        }

        let lu = self.a.view((0, 0), (n_int, n_int)).clone_owned().lu();
        if !has_regular_pivots(&lu.u().diagonal()) {
            return Err(FaceInterpolationError::SingularSystem { variable });
        }
        let mut x = self.b.view_mut((0, 0), (n_int, n_int));
        if !lu.solve_mut(&mut x) || x.iter().any(|value| !value.is_finite()) {
            return Err(FaceInterpolationError::SingularSystem { variable });
        }

        // Derivatives in the face-aligned frame: D_i = F_i X
        for i in 0..n_bases {
            let differential = Differential(i);
            for (j, &index) in self.face_basis.iter().enumerate() {
                let mut column = self.f.generic_view_mut((0, j), (Dyn(n_quadrature), U1::name()));
                populate_basis_values(&mut column, &self.face_points, face_centre, face_scale, index, differential);
            }
            self.d[i].view_mut((0, 0), (n_quadrature, n_int)).gemm(
                T::one(),
                &self.f.view((0, 0), (n_quadrature, n_int)),
                &self.b.view((0, 0), (n_int, n_int)),
                T::zero(),
            );
        }

        // Cartesian derivatives are linear combinations of the rotated ones
        let transformation = self.frame.transformation();
        for (r, request) in config.requests_for_variable(variable) {
            let mut operator = operators.operator_mut(r);
            operator.fill(T::zero());
            let target = request.differential.index();
            for (i, d) in self.d.iter().take(n_bases).enumerate() {
                let weight = transformation[(target, i)];
                if weight != T::zero() {
                    operator.zip_apply(&d.view((0, 0), (n_quadrature, n_int)), |o, d_q| *o += weight * d_q);
                }
            }
        }

        Ok(())
    }
}

/// Computes the operators of all faces of the mesh in parallel.
///
/// Every worker thread allocates its own workspace. Faces whose computation fails are left
/// without operators, and the first error is returned with the index of the offending face.
pub fn compute_all_face_operators<T>(
    mesh: &mut FaceMesh<T>,
    config: &SolverConfig,
    catalog: &BoundaryConditionCatalog,
) -> eyre::Result<()>
where
    T: Real + Send + Sync,
{
    config.validate()?;
    catalog.validate(config)?;
    let n_variables = config.n_variables();
    let dimensions = WorkspaceDimensions::from_config(config, catalog);
    let (elements, faces) = mesh.elements_and_faces_mut();
    debug!("Computing operators of {} faces in parallel", faces.len());

    faces.par_iter_mut().enumerate().try_for_each_init(
        || FaceInterpolationWorkspace::try_with_dimensions(n_variables, dimensions),
        |workspace, (face_index, face)| -> eyre::Result<()> {
            let workspace = workspace
                .as_mut()
                .map_err(|err| eyre::Report::new(err.clone()).wrap_err("Failed to allocate face interpolation workspace"))?;
            face.update_operators(workspace, elements, config, catalog)
                .wrap_err_with(|| format!("Failed to compute operators of face {face_index}"))
        },
    )
}

/// Computes the operators of all faces of the mesh on the current thread, reusing one workspace.
pub fn compute_all_face_operators_serial<T: Real>(
    mesh: &mut FaceMesh<T>,
    config: &SolverConfig,
    catalog: &BoundaryConditionCatalog,
) -> eyre::Result<()> {
    let mut workspace = FaceInterpolationWorkspace::try_new(config, catalog)
        .wrap_err("Failed to allocate face interpolation workspace")?;
    let (elements, faces) = mesh.elements_and_faces_mut();
    debug!("Computing operators of {} faces", faces.len());
    for (face_index, face) in faces.iter_mut().enumerate() {
        face.update_operators(&mut workspace, elements, config, catalog)
            .wrap_err_with(|| format!("Failed to compute operators of face {face_index}"))?;
    }
    Ok(())
}
