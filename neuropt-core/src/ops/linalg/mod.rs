// src/ops/linalg/mod.rs

pub mod inverse;
pub mod matmul;
pub mod transpose;

pub use inverse::inverse;
pub use matmul::matmul;
pub use transpose::transpose;

use crate::error::NeuroptError;
use crate::tensor::Tensor;

/// Returns `(rows, cols)` of a 2-D tensor.
pub(crate) fn matrix_dims(t: &Tensor, operation: &str) -> Result<(usize, usize), NeuroptError> {
    match t.shape() {
        [rows, cols] => Ok((*rows, *cols)),
        other => Err(NeuroptError::ShapeMismatch {
            expected: vec![0, 0],
            actual: other.to_vec(),
            operation: format!("{} (expects a 2-D tensor)", operation),
        }),
    }
}
