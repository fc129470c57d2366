//! Dense interpolation operators of a single face.
use crate::error::FaceInterpolationError;
use crate::workspace::{try_filled_vec, try_with_capacity};
use crate::Real;
use nalgebra::{DMatrixView, DMatrixViewMut, DVector, DVectorView, Scalar};

/// Location of one operator inside the contiguous storage of [`FaceOperators`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OperatorLayout {
    pub offset: usize,
    pub nrows: usize,
    pub ncols: usize,
}

impl OperatorLayout {
    pub fn len(&self) -> usize {
        self.nrows * self.ncols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The interpolation operators of a face, one per interpolation request.
///
/// Operator `r` is an `n_quadrature x n_inputs` matrix stored in column-major order. Its inputs
/// are the Taylor coefficients of the variable in each bordering element, followed on boundary
/// faces by the constraint values at each face quadrature point:
/// `[u_border_0; u_border_1; g_0; g_1; ...]`. Row `q` of the product is the requested quantity
/// at face quadrature point `q`.
///
/// All operators share a single allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceOperators<T: Scalar> {
    data: Vec<T>,
    layout: Vec<OperatorLayout>,
}

impl<T: Real> FaceOperators<T> {
    /// Allocates zeroed operators with `n_quadrature` rows and the given column counts.
    pub(crate) fn try_zeros(
        n_quadrature: usize,
        column_counts: impl ExactSizeIterator<Item = usize>,
    ) -> Result<Self, FaceInterpolationError> {
        let mut layout = try_with_capacity(column_counts.len(), "operator layout")?;
        let mut offset = 0usize;
        for ncols in column_counts {
            let entry = OperatorLayout {
                offset,
                nrows: n_quadrature,
                ncols,
            };
            offset = n_quadrature
                .checked_mul(ncols)
                .and_then(|len| offset.checked_add(len))
                .ok_or(FaceInterpolationError::Memory {
                    buffer: "operators",
                    len: usize::MAX,
                })?;
            layout.push(entry);
        }
        let data = try_filled_vec(offset, T::zero(), "operators")?;
        Ok(Self { data, layout })
    }

    pub(crate) fn operator_mut(&mut self, index: usize) -> DMatrixViewMut<T> {
        let OperatorLayout { offset, nrows, ncols } = self.layout[index];
        DMatrixViewMut::from_slice(&mut self.data[offset..offset + nrows * ncols], nrows, ncols)
    }

    /// Computes the requested quantity at every face quadrature point.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` does not match the number of columns of the operator.
    pub fn apply(&self, index: usize, inputs: &[T]) -> DVector<T> {
        let operator = self.operator(index);
        assert_eq!(
            operator.ncols(),
            inputs.len(),
            "Number of inputs must match the number of operator columns"
        );
        operator * DVectorView::from_slice(inputs, inputs.len())
    }
}

impl<T: Scalar> FaceOperators<T> {
    pub fn num_operators(&self) -> usize {
        self.layout.len()
    }

    pub fn layout(&self, index: usize) -> &OperatorLayout {
        &self.layout[index]
    }

    /// Operator of the interpolation request with the given index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn operator(&self, index: usize) -> DMatrixView<T> {
        let OperatorLayout { offset, nrows, ncols } = self.layout[index];
        DMatrixView::from_slice(&self.data[offset..offset + nrows * ncols], nrows, ncols)
    }

    pub fn iter(&self) -> impl '_ + ExactSizeIterator<Item = DMatrixView<T>> {
        (0..self.num_operators()).map(move |index| self.operator(index))
    }

    /// Contiguous storage of all operators.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}
