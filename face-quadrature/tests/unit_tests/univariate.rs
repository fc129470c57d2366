use face_quadrature::univariate::{gauss, try_gauss};
use face_quadrature::{integrate, Error};
use matrixcompare::assert_scalar_eq;

#[test]
fn gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=60 {
        let expected_polynomial_degree = 2 * n - 1;
        let rule = gauss(n);

        assert!(rule.0.iter().all(|&w| w > 0.0));

        for alpha in 0..=expected_polynomial_degree as i32 {
            let monomial_integral = (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0);
            let estimated_integral = integrate(&rule, |x| x[0].powi(alpha));
            assert_scalar_eq!(estimated_integral, monomial_integral, comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn gauss_points_are_increasing_and_symmetric() {
    for n in 1..=15 {
        let (weights, points) = gauss(n);
        assert!(points.windows(2).all(|pair| pair[0][0] < pair[1][0]));
        for i in 0..n {
            assert_scalar_eq!(points[i][0], -points[n - 1 - i][0], comp = abs, tol = 1e-15);
            assert_scalar_eq!(weights[i], weights[n - 1 - i], comp = abs, tol = 1e-15);
        }
    }
}

#[test]
fn gauss_with_zero_points_is_an_error() {
    assert_eq!(try_gauss(0), Err(Error::EmptyRule));
}
