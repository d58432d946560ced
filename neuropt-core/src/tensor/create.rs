// src/tensor/create.rs

use crate::error::NeuroptError;
use crate::tensor::Tensor;
use num_traits::ToPrimitive;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Creates a rank-0 tensor holding `value`.
pub fn scalar(value: f64) -> Tensor {
    full(&[], value)
}

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Tensor {
    full(shape, 0.0)
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Tensor {
    full(shape, 1.0)
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full(shape: &[usize], value: f64) -> Tensor {
    let numel = shape.iter().product();
    Tensor {
        data: vec![value; numel],
        shape: shape.to_vec(),
    }
}

/// Creates a zero tensor with the same shape as `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Tensor {
    zeros(tensor.shape())
}

/// Creates an `n x n` identity matrix.
pub fn eye(n: usize) -> Tensor {
    let mut t = zeros(&[n, n]);
    for i in 0..n {
        t.data[i * n + i] = 1.0;
    }
    t
}

/// Creates a tensor from any primitive numeric values (`i32`, `f32`, `u8`, ...).
pub fn from_values<T: ToPrimitive>(values: &[T], shape: Vec<usize>) -> Result<Tensor, NeuroptError> {
    let data = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.to_f64().ok_or_else(|| {
                NeuroptError::InternalError(format!("Value at index {} is not representable as f64", i))
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;
    Tensor::new(data, shape)
}

/// Samples a tensor from `N(mean, std²)`.
pub fn rand_normal<R: Rng + ?Sized>(
    shape: &[usize],
    mean: f64,
    std: f64,
    rng: &mut R,
) -> Result<Tensor, NeuroptError> {
    if !(mean.is_finite() && std.is_finite()) {
        return Err(NeuroptError::InvalidDistribution(format!(
            "normal requires finite parameters, got mean={}, std={}",
            mean, std
        )));
    }
    let normal = Normal::new(mean, std)
        .map_err(|e| NeuroptError::InvalidDistribution(format!("normal(mean={}, std={}): {}", mean, std, e)))?;
    let numel = shape.iter().product();
    let data: Vec<f64> = (0..numel).map(|_| normal.sample(rng)).collect();
    Tensor::new(data, shape.to_vec())
}

/// Samples a tensor uniformly from `[low, high)`.
pub fn rand_uniform<R: Rng + ?Sized>(
    shape: &[usize],
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<Tensor, NeuroptError> {
    if !(low < high) {
        return Err(NeuroptError::InvalidDistribution(format!(
            "uniform requires low < high, got [{}, {})",
            low, high
        )));
    }
    // `Uniform::new` panics on an infinite range.
    if !(low.is_finite() && high.is_finite() && (high - low).is_finite()) {
        return Err(NeuroptError::InvalidDistribution(format!(
            "uniform requires a finite range, got [{}, {})",
            low, high
        )));
    }
    let uniform = Uniform::new(low, high);
    let numel = shape.iter().product();
    let data: Vec<f64> = (0..numel).map(|_| uniform.sample(rng)).collect();
    Tensor::new(data, shape.to_vec())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
