use super::{element_coefficients, single_variable_config, test_polynomial};
use face_interpolation::condition::{BoundaryCondition, BoundaryConditionCatalog};
use face_interpolation::config::{InterpolationRequest, SolverConfig, Variable};
use face_interpolation::interpolation::enumerate_face_basis;
use face_interpolation::mesh::procedural::{create_rectangular_strip, StripOptions};
use face_interpolation::mesh::{Element, Face};
use face_interpolation::quadrature::{Quadrature, QuadratureRule};
use face_interpolation::taylor::{basis_count, taylor_powers, Differential};
use face_interpolation::workspace::FaceInterpolationWorkspace;
use face_interpolation::{ErrorKind, FaceInterpolationError};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DMatrix, Point2};
use proptest::prelude::*;
use std::collections::HashSet;

#[test]
fn constant_fields_are_averaged() {
    // One quadrature point per element, at equal distance on either side of the face
    let options = StripOptions {
        element_points_per_dim: 1,
        face_points: 1,
        boundary_tag: None,
    };
    let mut mesh = create_rectangular_strip(&Point2::origin(), 1.0, 2, 1, &options).unwrap();
    let config = single_variable_config(0, &[Differential::VALUE], 1, 1);
    let catalog = BoundaryConditionCatalog::default();
    let mut workspace = FaceInterpolationWorkspace::try_new(&config, &catalog).unwrap();

    let (elements, faces) = mesh.elements_and_faces_mut();
    faces[0]
        .update_operators(&mut workspace, elements, &config, &catalog)
        .unwrap();
    assert_eq!(workspace.n_adj_bases(), &[2]);
    assert_eq!(workspace.n_int_bases(), &[2]);

    let operators = faces[0].operators().unwrap();
    assert_eq!(operators.num_operators(), 1);
    assert_matrix_eq!(
        operators.operator(0),
        DMatrix::from_row_slice(1, 2, &[0.5, 0.5]),
        comp = abs,
        tol = 1e-14
    );
    let values = operators.apply(0, &[3.0, 7.0]);
    assert_scalar_eq!(values[0], 5.0, comp = abs, tol = 1e-14);
}

/// Computes the operators of the interior face of two elements and applies them to the exact
/// coefficients of a polynomial of the element order. Returns the largest error over all
/// differentials up to the element order.
fn reproduction_error(order: usize, face_points: usize, element_points_per_dim: usize) -> Result<f64, FaceInterpolationError> {
    let options = StripOptions {
        element_points_per_dim,
        face_points,
        boundary_tag: None,
    };
    let mut mesh = create_rectangular_strip(&Point2::new(-0.3, 0.2), 0.8, 2, 1, &options).unwrap();
    let differentials: Vec<_> = (0..basis_count(order)).map(Differential).collect();
    let config = single_variable_config(order, &differentials, face_points, element_points_per_dim.pow(2));
    let catalog = BoundaryConditionCatalog::default();
    let mut workspace = FaceInterpolationWorkspace::try_new(&config, &catalog).unwrap();

    let (elements, faces) = mesh.elements_and_faces_mut();
    let face = &mut faces[0];
    face.update_operators(&mut workspace, elements, &config, &catalog)?;

    let f = test_polynomial(order);
    let inputs: Vec<f64> = face
        .borders()
        .iter()
        .flat_map(|&border| element_coefficients(&f, &elements[border], order))
        .collect();

    let operators = face.operators().unwrap();
    assert_eq!(operators.num_operators(), differentials.len());
    let mut max_error = 0.0f64;
    for (r, differential) in differentials.iter().enumerate() {
        let (a, b) = differential.powers();
        let values = operators.apply(r, &inputs);
        for (value, x) in values.iter().zip(face.quadrature().points()) {
            max_error = max_error.max((value - f.derivative(a, b, x)).abs());
        }
    }
    Ok(max_error)
}

#[test]
fn polynomials_are_reproduced_exactly() {
    for order in 0..=2 {
        let error = reproduction_error(order, order + 1, order + 1).unwrap();
        assert!(error <= 1e-9, "order {order}: error {error:e}");
    }
}

#[test]
fn operators_either_reproduce_polynomials_or_fail() {
    for order in 0..=3 {
        for face_points in 1..=4 {
            for element_points_per_dim in 1..=4 {
                let well_posed = face_points > order && element_points_per_dim > order;
                let context = format!("order {order}, {face_points} face points, {element_points_per_dim}^2 element points");
                match reproduction_error(order, face_points, element_points_per_dim) {
                    Ok(error) => {
                        assert!(well_posed, "{context}: expected an error");
                        assert!(error <= 1e-9, "{context}: error {error:e}");
                    }
                    Err(FaceInterpolationError::BasisCountMismatch { .. }) => {
                        assert!(face_points <= order, "{context}");
                    }
                    Err(FaceInterpolationError::SingularSystem { .. }) => {
                        assert!(face_points > order && element_points_per_dim <= order, "{context}");
                    }
                    Err(err) => panic!("{context}: unexpected error {err}"),
                }
            }
        }
    }
}

#[test]
fn too_few_face_points_are_a_basis_count_mismatch() {
    // A linear interpolant along the face cannot be resolved by a single face point
    let err = reproduction_error(1, 1, 3).unwrap_err();
    assert_eq!(
        err,
        FaceInterpolationError::BasisCountMismatch {
            variable: 0,
            expected: 6,
            enumerated: 4
        }
    );
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn too_few_element_points_give_a_singular_system() {
    // 2 x 2 element points cannot determine the 6 coefficients of a quadratic
    let err = reproduction_error(2, 3, 2).unwrap_err();
    assert_eq!(err, FaceInterpolationError::SingularSystem { variable: 0 });
    assert_eq!(err.kind(), ErrorKind::Numerical);
}

#[test]
fn operators_follow_request_order_and_shapes() {
    let config = SolverConfig {
        variables: vec![Variable::new("u", 1), Variable::new("c", 0)],
        interpolations: vec![
            InterpolationRequest::new(0, Differential::VALUE),
            InterpolationRequest::new(1, Differential::VALUE),
            InterpolationRequest::new(0, Differential::DY),
        ],
        max_face_quadrature: 2,
        max_element_quadrature: 4,
    };
    let catalog = BoundaryConditionCatalog::new(vec![BoundaryCondition::new(
        "dirichlet on u",
        vec![vec![Differential::VALUE], vec![]],
    )]);
    let options = StripOptions {
        boundary_tag: Some(0),
        ..StripOptions::default()
    };
    let mut mesh = create_rectangular_strip(&Point2::origin(), 1.0, 2, 1, &options).unwrap();
    let mut workspace = FaceInterpolationWorkspace::try_new(&config, &catalog).unwrap();
    let (elements, faces) = mesh.elements_and_faces_mut();

    // Interior face
    faces[0]
        .update_operators(&mut workspace, elements, &config, &catalog)
        .unwrap();
    assert_eq!(workspace.n_adj_bases(), &[6, 2]);
    assert_eq!(workspace.n_int_bases(), &[6, 2]);
    let operators = faces[0].operators().unwrap();
    let shapes: Vec<_> = operators.iter().map(|op| op.shape()).collect();
    assert_eq!(shapes, vec![(2, 6), (2, 2), (2, 6)]);

    // Boundary face: the Dirichlet values of u follow the element coefficients
    let boundary = faces.iter().position(|face| face.is_boundary()).unwrap();
    faces[boundary]
        .update_operators(&mut workspace, elements, &config, &catalog)
        .unwrap();
    assert_eq!(workspace.n_adj_bases(), &[3, 1]);
    assert_eq!(workspace.n_int_bases(), &[5, 1]);
    let operators = faces[boundary].operators().unwrap();
    let shapes: Vec<_> = operators.iter().map(|op| op.shape()).collect();
    assert_eq!(shapes, vec![(2, 5), (2, 1), (2, 5)]);
    assert_eq!(operators.as_slice().len(), 10 + 2 + 10);
    assert_eq!(operators.layout(2).offset, 12);
}

#[test]
fn recomputation_is_bit_identical() {
    let options = StripOptions {
        element_points_per_dim: 3,
        face_points: 3,
        boundary_tag: None,
    };
    let mut mesh = create_rectangular_strip(&Point2::origin(), 0.5, 3, 2, &options).unwrap();
    let differentials = [Differential::VALUE, Differential::DX, Differential::DY];
    let config = single_variable_config(2, &differentials, 3, 9);
    let catalog = BoundaryConditionCatalog::default();
    let mut workspace = FaceInterpolationWorkspace::try_new(&config, &catalog).unwrap();
    let (elements, faces) = mesh.elements_and_faces_mut();

    let first = workspace
        .compute_face_operators(&faces[0], elements, &config, &catalog)
        .unwrap();
    // Process other faces in between to make sure no state leaks between faces
    for face in faces.iter().skip(1) {
        workspace
            .compute_face_operators(face, elements, &config, &catalog)
            .unwrap();
    }
    let second = workspace
        .compute_face_operators(&faces[0], elements, &config, &catalog)
        .unwrap();
    assert_eq!(first.as_slice(), second.as_slice());
}

#[test]
fn singular_system_is_a_numerical_error() {
    // Both element rules sample the face centre only, so the normal direction is not resolved
    let rule = || QuadratureRule::from_weights_and_points(vec![1.0], vec![Point2::new(1.0, 0.5)]).unwrap();
    let elements = vec![
        Element::new(Point2::new(0.5, 0.5), 1.0, rule()),
        Element::new(Point2::new(1.5, 0.5), 1.0, rule()),
    ];
    let mut face = Face::from_segment(&Point2::new(1.0, 0.0), &Point2::new(1.0, 1.0), 1, vec![0, 1]).unwrap();
    let config = single_variable_config(0, &[Differential::VALUE], 1, 1);
    let catalog = BoundaryConditionCatalog::default();
    let mut workspace = FaceInterpolationWorkspace::try_new(&config, &catalog).unwrap();

    let err = face
        .update_operators(&mut workspace, &elements, &config, &catalog)
        .unwrap_err();
    assert_eq!(err, FaceInterpolationError::SingularSystem { variable: 0 });
    assert_eq!(err.kind(), ErrorKind::Numerical);
    assert!(face.operators().is_none());
}

#[test]
fn failed_update_clears_previous_operators() {
    let options = StripOptions {
        element_points_per_dim: 1,
        face_points: 1,
        boundary_tag: None,
    };
    let mut mesh = create_rectangular_strip(&Point2::origin(), 1.0, 2, 1, &options).unwrap();
    let config = single_variable_config(0, &[Differential::VALUE], 1, 1);
    let catalog = BoundaryConditionCatalog::default();
    let mut workspace = FaceInterpolationWorkspace::try_new(&config, &catalog).unwrap();
    let (elements, faces) = mesh.elements_and_faces_mut();
    let face = &mut faces[0];
    face.update_operators(&mut workspace, elements, &config, &catalog)
        .unwrap();
    assert!(face.operators().is_some());

    // Elements missing
    let err = face
        .update_operators(&mut workspace, &elements[..1], &config, &catalog)
        .unwrap_err();
    assert!(matches!(err, FaceInterpolationError::InvalidConfiguration(_)));
    assert!(face.operators().is_none());
}

#[test]
fn invalid_faces_are_configuration_errors() {
    let options = StripOptions {
        element_points_per_dim: 2,
        face_points: 2,
        boundary_tag: Some(1),
    };
    let mesh = create_rectangular_strip(&Point2::origin(), 1.0, 1, 1, &options).unwrap();
    let config = single_variable_config(1, &[Differential::VALUE], 2, 4);
    let catalog = BoundaryConditionCatalog::new(vec![BoundaryCondition::new(
        "dirichlet",
        vec![vec![Differential::VALUE]],
    )]);
    let mut workspace = FaceInterpolationWorkspace::try_new(&config, &catalog).unwrap();

    // Tag 1 is not in the catalog
    let err = workspace
        .compute_face_operators(&mesh.faces[0], &mesh.elements, &config, &catalog)
        .unwrap_err();
    assert!(matches!(err, FaceInterpolationError::InvalidConfiguration(_)), "{err}");

    // More face points than the workspace was sized for
    let face = Face::from_segment(&Point2::new(1.0, 0.0), &Point2::new(1.0, 1.0), 3, vec![0]).unwrap();
    let err = workspace
        .compute_face_operators(&face, &mesh.elements, &config, &catalog)
        .unwrap_err();
    assert!(matches!(err, FaceInterpolationError::WorkspaceTooSmall { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::Configuration);

    // Higher order than the workspace was sized for
    let quadratic = single_variable_config(2, &[Differential::VALUE], 2, 4);
    let face = face.with_boundary_tag(0);
    let err = workspace
        .compute_face_operators(&face, &mesh.elements, &quadratic, &catalog)
        .unwrap_err();
    assert!(matches!(err, FaceInterpolationError::WorkspaceTooSmall { .. }), "{err}");
}

proptest! {
    #[test]
    fn face_basis_is_the_bounded_monomial_set(
        n_borders in 1..=2usize,
        n_quadrature in 1..=6usize,
        order in 0..=4usize,
        n_constraints in 0..=3usize
    ) {
        let mut basis = Vec::new();
        let count = enumerate_face_basis(n_borders, n_quadrature, order, n_constraints, &mut basis);
        prop_assert_eq!(basis.len(), count);
        // Never more candidates than unknowns
        prop_assert!(count <= n_borders * basis_count(order) + n_constraints * n_quadrature);

        let bound = n_borders * (order + 1) + n_constraints;
        let bounded: HashSet<_> = (0..basis_count(bound))
            .filter(|&index| {
                let (p, q) = taylor_powers(index);
                p + n_borders * q < bound && q < n_quadrature
            })
            .collect();
        let distinct: HashSet<_> = basis.iter().copied().collect();
        prop_assert_eq!(distinct.len(), count);
        prop_assert_eq!(distinct, bounded);

        let levels: Vec<_> = basis
            .iter()
            .map(|&index| {
                let (p, q) = taylor_powers(index);
                p + n_borders * q
            })
            .collect();
        prop_assert!(levels.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
