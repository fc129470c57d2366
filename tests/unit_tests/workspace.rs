use face_interpolation::condition::{BoundaryCondition, BoundaryConditionCatalog};
use face_interpolation::config::{InterpolationRequest, SolverConfig, Variable};
use face_interpolation::taylor::Differential;
use face_interpolation::workspace::{FaceInterpolationWorkspace, WorkspaceDimensions};
use face_interpolation::{ErrorKind, FaceInterpolationError};

fn config(max_face_quadrature: usize, max_element_quadrature: usize) -> SolverConfig {
    SolverConfig {
        variables: vec![Variable::new("u", 2), Variable::new("v", 1)],
        interpolations: vec![InterpolationRequest::new(0, Differential::VALUE)],
        max_face_quadrature,
        max_element_quadrature,
    }
}

fn catalog() -> BoundaryConditionCatalog {
    BoundaryConditionCatalog::new(vec![
        BoundaryCondition::new("dirichlet", vec![vec![Differential::VALUE], vec![]]),
        BoundaryCondition::new("robin", vec![vec![Differential::VALUE, Differential::DX], vec![]]),
    ])
}

#[test]
fn dimensions_cover_worst_case() {
    let dims = WorkspaceDimensions::from_config(&config(3, 9), &catalog());
    assert_eq!(dims.max_order, 2);
    assert_eq!(dims.max_basis_count, 6);
    assert_eq!(dims.max_constraints, 2);
    assert_eq!(dims.max_adjacent_bases(), 12);
    assert_eq!(dims.max_interpolation_bases(), 18);
    assert_eq!(dims.max_border_points(), 18);

    let workspace = FaceInterpolationWorkspace::<f64>::try_new(&config(3, 9), &catalog()).unwrap();
    assert_eq!(workspace.dimensions(), &dims);
    assert_eq!(workspace.n_adj_bases(), &[0, 0]);
    assert_eq!(workspace.n_int_bases(), &[0, 0]);
}

#[test]
fn absurd_sizes_fail_with_memory_error() {
    let result = FaceInterpolationWorkspace::<f64>::try_new(&config(usize::MAX / 2, 4), &catalog());
    let err = result.unwrap_err();
    assert!(matches!(err, FaceInterpolationError::Memory { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::Memory);

    let result = FaceInterpolationWorkspace::<f64>::try_new(&config(2, usize::MAX / 4), &catalog());
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Memory);
}

#[test]
fn invalid_input_is_rejected_before_allocation() {
    let mut invalid_config = config(2, 4);
    invalid_config.variables.truncate(1);
    // The catalog now has constraints for more variables than the config
    let err = FaceInterpolationWorkspace::<f64>::try_new(&invalid_config, &catalog()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
