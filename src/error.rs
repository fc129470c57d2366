//! Errors produced while building face interpolation operators.
use std::collections::TryReserveError;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Coarse classification of a [`FaceInterpolationError`].
///
/// `Configuration` errors indicate an inconsistency between the solver configuration, the
/// boundary condition catalog and the mesh. They cannot be fixed by retrying and the run should
/// be aborted. `Numerical` errors mean that the weak system of a particular face could not be
/// solved, so the operators of that face are unusable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Memory,
    Configuration,
    Numerical,
}

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FaceInterpolationError {
    /// A buffer could not be allocated.
    Memory {
        /// Name of the buffer that could not be obtained.
        buffer: &'static str,
        /// Number of entries that were requested.
        len: usize,
    },
    /// The face-local basis enumeration did not produce the analytically expected number of
    /// monomials.
    BasisCountMismatch {
        variable: usize,
        expected: usize,
        enumerated: usize,
    },
    /// The weak interpolation system of a variable is singular or numerically rank deficient.
    SingularSystem { variable: usize },
    /// The face normal does not define an invertible rotation.
    DegenerateNormal,
    /// A face needs more scratch space than the workspace was sized for.
    WorkspaceTooSmall {
        what: &'static str,
        required: usize,
        capacity: usize,
    },
    /// The configuration, the condition catalog or the mesh data are inconsistent.
    InvalidConfiguration(String),
}

impl FaceInterpolationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Memory { .. } => ErrorKind::Memory,
            Self::SingularSystem { .. } | Self::DegenerateNormal => ErrorKind::Numerical,
            Self::BasisCountMismatch { .. } | Self::WorkspaceTooSmall { .. } | Self::InvalidConfiguration(_) => {
                ErrorKind::Configuration
            }
        }
    }

    pub(crate) fn memory(buffer: &'static str, len: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| Self::Memory { buffer, len }
    }
}

impl Display for FaceInterpolationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory { buffer, len } => {
                write!(f, "Failed to allocate {len} entries for buffer `{buffer}`")
            }
            Self::BasisCountMismatch {
                variable,
                expected,
                enumerated,
            } => write!(
                f,
                "Mismatched number of interpolation bases for variable {variable}: \
                 expected {expected}, enumerated {enumerated}"
            ),
            Self::SingularSystem { variable } => {
                write!(f, "Interpolation system for variable {variable} is singular")
            }
            Self::DegenerateNormal => write!(f, "Face normal does not define an invertible rotation"),
            Self::WorkspaceTooSmall {
                what,
                required,
                capacity,
            } => write!(
                f,
                "Workspace too small: {what} requires {required}, but the workspace holds {capacity}"
            ),
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for FaceInterpolationError {}
