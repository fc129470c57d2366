//! Boundary conditions expressed as constraints on the face interpolant.
//!
//! A boundary condition pins, for each variable, zero or more differentials of the face
//! interpolant at every quadrature point of a boundary face. Constraint differentials are taken
//! in the face-aligned frame: the first axis is the outward face normal, the second is
//! tangential. Hence [`Differential::VALUE`] is a Dirichlet constraint and [`Differential::DX`]
//! prescribes the normal derivative.
//!
//! The order of the constraints of a variable is significant. Constraint `c` of a variable
//! occupies inputs `n_adj + c * n_quadrature .. n_adj + (c + 1) * n_quadrature` of the resulting
//! face operators.
use crate::config::SolverConfig;
use crate::error::FaceInterpolationError;
use crate::taylor::Differential;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub name: String,
    /// Constrained differentials, one list per variable.
    pub constraints: Vec<Vec<Differential>>,
}

impl BoundaryCondition {
    pub fn new(name: impl Into<String>, constraints: Vec<Vec<Differential>>) -> Self {
        Self {
            name: name.into(),
            constraints,
        }
    }

    /// Constrained differentials of the given variable.
    pub fn differentials(&self, variable: usize) -> &[Differential] {
        self.constraints
            .get(variable)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn n_constraints(&self, variable: usize) -> usize {
        self.differentials(variable).len()
    }
}

/// The boundary conditions of a problem, addressed by the boundary tag of a face.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConditionCatalog {
    pub conditions: Vec<BoundaryCondition>,
}

impl BoundaryConditionCatalog {
    pub fn new(conditions: Vec<BoundaryCondition>) -> Self {
        Self { conditions }
    }

    pub fn get(&self, tag: usize) -> Option<&BoundaryCondition> {
        self.conditions.get(tag)
    }

    /// Largest number of constraints on any single variable over all conditions.
    pub fn max_n_constraints(&self) -> usize {
        self.conditions
            .iter()
            .flat_map(|condition| condition.constraints.iter().map(Vec::len))
            .max()
            .unwrap_or(0)
    }

    pub fn validate(&self, config: &SolverConfig) -> Result<(), FaceInterpolationError> {
        for (tag, condition) in self.conditions.iter().enumerate() {
            if condition.constraints.len() != config.n_variables() {
                return Err(FaceInterpolationError::InvalidConfiguration(format!(
                    "boundary condition {tag} (`{}`) has constraints for {} variables, expected {}",
                    condition.name,
                    condition.constraints.len(),
                    config.n_variables()
                )));
            }
            for (variable, differentials) in condition.constraints.iter().enumerate() {
                // The face basis of a constrained variable reaches one order beyond the element basis
                let max_order = config.variables[variable].order + 1;
                if let Some(differential) = differentials
                    .iter()
                    .find(|differential| differential.order() > max_order)
                {
                    return Err(FaceInterpolationError::InvalidConfiguration(format!(
                        "boundary condition {tag} (`{}`) constrains differential {differential} of variable {variable}, \
                         which exceeds order {max_order}",
                        condition.name
                    )));
                }
            }
        }
        Ok(())
    }
}
