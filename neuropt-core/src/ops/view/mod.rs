// src/ops/view/mod.rs
// Axis-0 row manipulation used by batched graph construction.

use crate::error::NeuroptError;
use crate::tensor::Tensor;
use std::borrow::Borrow;

/// Returns row `index` along axis 0: `[R, ...rest] -> [...rest]`.
pub fn select(a: &Tensor, index: usize) -> Result<Tensor, NeuroptError> {
    let (rows, rest) = match a.shape().split_first() {
        Some((&rows, rest)) => (rows, rest.to_vec()),
        None => {
            return Err(NeuroptError::UnsupportedOperation(
                "select on a rank-0 tensor".to_string(),
            ))
        }
    };
    if index >= rows {
        return Err(NeuroptError::IndexOutOfBounds {
            index,
            shape: a.shape().to_vec(),
        });
    }
    let row_len: usize = rest.iter().product();
    let start = index * row_len;
    Tensor::new(a.data()[start..start + row_len].to_vec(), rest)
}

/// Places `a` as row `index` of a zero tensor with `rows` rows.
///
/// Adjoint of [`select`].
pub fn embed(a: &Tensor, index: usize, rows: usize) -> Result<Tensor, NeuroptError> {
    let mut shape = Vec::with_capacity(a.rank() + 1);
    shape.push(rows);
    shape.extend_from_slice(a.shape());
    if index >= rows {
        return Err(NeuroptError::IndexOutOfBounds { index, shape });
    }
    let row_len = a.numel();
    let mut data = vec![0.0; rows * row_len];
    data[index * row_len..(index + 1) * row_len].copy_from_slice(a.data());
    Tensor::new(data, shape)
}

/// Stacks tensors of identical shape along a new leading axis.
pub fn stack<T: Borrow<Tensor>>(tensors: &[T]) -> Result<Tensor, NeuroptError> {
    let first: &Tensor = tensors.first().ok_or(NeuroptError::EmptyTensorList)?.borrow();
    let mut data = Vec::with_capacity(first.numel() * tensors.len());
    for t in tensors {
        let t: &Tensor = t.borrow();
        if t.shape() != first.shape() {
            return Err(NeuroptError::ShapeMismatch {
                expected: first.shape().to_vec(),
                actual: t.shape().to_vec(),
                operation: "stack".to_string(),
            });
        }
        data.extend_from_slice(t.data());
    }
    let mut shape = vec![tensors.len()];
    shape.extend_from_slice(first.shape());
    Tensor::new(data, shape)
}
