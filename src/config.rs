//! Solver-wide configuration: variables, interpolation requests and workspace limits.
use crate::error::FaceInterpolationError;
use crate::taylor::{basis_count, Differential};
use serde::{Deserialize, Serialize};

/// A scalar field represented by a Taylor polynomial of the given total degree in each element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub order: usize,
}

impl Variable {
    pub fn new(name: impl Into<String>, order: usize) -> Self {
        Self {
            name: name.into(),
            order,
        }
    }

    pub fn basis_count(&self) -> usize {
        basis_count(self.order)
    }
}

/// A quantity (value or Cartesian derivative of a variable) needed at face quadrature points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterpolationRequest {
    pub variable: usize,
    pub differential: Differential,
}

impl InterpolationRequest {
    pub fn new(variable: usize, differential: Differential) -> Self {
        Self { variable, differential }
    }
}

/// Global dimensions that face interpolation depends on.
///
/// `max_face_quadrature` and `max_element_quadrature` bound the number of quadrature points of
/// any face and any element, and determine the size of the scratch workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub variables: Vec<Variable>,
    pub interpolations: Vec<InterpolationRequest>,
    pub max_face_quadrature: usize,
    pub max_element_quadrature: usize,
}

impl SolverConfig {
    pub fn n_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn n_interpolations(&self) -> usize {
        self.interpolations.len()
    }

    pub fn max_order(&self) -> usize {
        self.variables
            .iter()
            .map(|variable| variable.order)
            .max()
            .unwrap_or(0)
    }

    pub fn max_basis_count(&self) -> usize {
        basis_count(self.max_order())
    }

    /// Interpolation requests targeting the given variable, together with their global index.
    pub fn requests_for_variable(&self, variable: usize) -> impl Iterator<Item = (usize, &InterpolationRequest)> {
        self.interpolations
            .iter()
            .enumerate()
            .filter(move |(_, request)| request.variable == variable)
    }

    pub fn validate(&self) -> Result<(), FaceInterpolationError> {
        let invalid = |msg: String| Err(FaceInterpolationError::InvalidConfiguration(msg));

        if self.variables.is_empty() {
            return invalid("at least one variable is required".to_string());
        }
        if self.max_face_quadrature == 0 || self.max_element_quadrature == 0 {
            return invalid("quadrature limits must be positive".to_string());
        }
        for (index, request) in self.interpolations.iter().enumerate() {
            let Some(variable) = self.variables.get(request.variable) else {
                return invalid(format!(
                    "interpolation {index} refers to variable {}, but there are only {} variables",
                    request.variable,
                    self.variables.len()
                ));
            };
            if request.differential.index() >= variable.basis_count() {
                return invalid(format!(
                    "interpolation {index} requests differential {} of variable `{}`, \
                     which exceeds its order {}",
                    request.differential, variable.name, variable.order
                ));
            }
        }
        Ok(())
    }
}
