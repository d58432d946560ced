// src/tensor/mod.rs

use crate::error::NeuroptError;
use std::fmt;

pub mod broadcast_utils;
pub mod create;

// Re-export creation functions to make them public
pub use create::{eye, from_values, full, ones, rand_normal, rand_uniform, scalar, zeros, zeros_like};

/// A dense, row-major, `f64` multi-dimensional array.
///
/// `Tensor` is a plain value: cloning copies the buffer. It is the concrete
/// data that flows through a compiled [`Program`](crate::graph::Program);
/// the symbolic side of the framework lives in [`crate::graph`].
///
/// A tensor of rank 0 (empty shape) holds exactly one element and is used
/// for scalars such as a loss value.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f64>,
    shape: Vec<usize>,
}

impl Tensor {
    /// Creates a new tensor from raw data and shape.
    ///
    /// # Errors
    /// Returns `TensorCreationError` if `data.len()` differs from the product
    /// of the shape dimensions.
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, NeuroptError> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(NeuroptError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Tensor { data, shape })
    }

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns the underlying contiguous buffer.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Consumes the tensor and returns its buffer.
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Returns the single value of a one-element tensor.
    pub fn item(&self) -> Result<f64, NeuroptError> {
        if self.data.len() != 1 {
            return Err(NeuroptError::ShapeMismatch {
                expected: vec![],
                actual: self.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(self.data[0])
    }

    /// Returns the element at a flat (row-major) position.
    pub fn get(&self, index: usize) -> Result<f64, NeuroptError> {
        self.data
            .get(index)
            .copied()
            .ok_or_else(|| NeuroptError::IndexOutOfBounds {
                index,
                shape: self.shape.clone(),
            })
    }

    /// Returns a tensor with the same data and a new shape.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<Tensor, NeuroptError> {
        let numel: usize = shape.iter().product();
        if numel != self.numel() {
            return Err(NeuroptError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: shape,
                operation: "reshape".to_string(),
            });
        }
        Ok(Tensor {
            data: self.data.clone(),
            shape,
        })
    }

    /// Returns a 1-D view of the data.
    pub fn flatten(&self) -> Tensor {
        Tensor {
            data: self.data.clone(),
            shape: vec![self.numel()],
        }
    }

    /// Applies `f` to every element.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Tensor {
        Tensor {
            data: self.data.iter().map(|&x| f(x)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Combines two tensors of identical shape element by element.
    pub fn zip_with<F: Fn(f64, f64) -> f64>(
        &self,
        other: &Tensor,
        operation: &str,
        f: F,
    ) -> Result<Tensor, NeuroptError> {
        if self.shape != other.shape {
            return Err(NeuroptError::IncompatibleShapes {
                shape1: self.shape.clone(),
                shape2: other.shape.clone(),
                operation: operation.to_string(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Tensor {
            data,
            shape: self.shape.clone(),
        })
    }

    /// Sums every element.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Checks element-wise closeness with an absolute tolerance.
    pub fn all_close(&self, other: &Tensor, tolerance: f64) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("data", &self.data)
            .finish()
    }
}
